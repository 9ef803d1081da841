pub mod models {
    pub mod honeywell;
}

pub mod client;
pub mod config;
pub mod translate {
    pub mod codec;
    pub mod command;
    pub mod drivers;
    pub mod state;
    pub mod units;
}
pub mod services {
    pub mod discovery;
    #[cfg(test)]
    pub mod fake_api;
    pub mod poll;
    pub mod sensor;
    pub mod thermostat;
}

use crate::client::HoneywellClient;
use crate::config::Config;
use crate::services::{discovery, poll};
use crate::translate::command::CommandRequest;
use crate::translate::state::ThreadBackoff;
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};

/// Bridge Honeywell Home thermostats and room sensors to host driver values.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Run one discovery and poll pass, then exit.
    #[arg(long)]
    once: bool,

    /// Issue one command to a node, re-query it, then exit.
    #[arg(long, num_args = 3, value_names = ["ADDRESS", "DRIVER", "VALUE"])]
    command: Option<Vec<String>>,
}

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

fn run(cli: &Cli) -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (api={}, poll_interval={}s, sensor_temperature_encoding={:?}, user_ref={})",
        cfg.api_base_url,
        cfg.poll_interval.as_secs(),
        cfg.sensor_temperature_encoding,
        if cfg.user_id.is_some() { "set" } else { "-" }
    );

    // 2) Init Honeywell client
    let client = HoneywellClient::new(&cfg.api_base_url, &cfg.client_id, cfg.user_id.clone(), &cfg.access_token)
        .map_err(|e| format!("Honeywell client setup failed: {}", e))?;
    let backoff = ThreadBackoff;

    // 3) Discover thermostats and room sensors
    let mut nodes = discovery::discover(&client, cfg.sensor_temperature_encoding)?;
    if nodes.is_empty() {
        return Err("No thermostats found; ensure the account has devices".into());
    }

    // 4) One-off command
    if let Some(args) = &cli.command {
        let [address, driver, value] = args.as_slice() else {
            return Err("`--command` takes ADDRESS DRIVER VALUE".to_string());
        };
        let request = CommandRequest {
            address: address.clone(),
            driver: driver.clone(),
            value: value.clone(),
        };
        let node = nodes
            .iter_mut()
            .find(|n| n.address() == request.address)
            .ok_or_else(|| format!("no node with address {}", request.address))?;
        node.handle_command(&client, &backoff, &request)?;
        info!("Command {} {} applied to {}", request.driver, request.value, request.address);
        return Ok(());
    }

    // 5) Poll (steady cadence)
    if cli.once {
        let failed = poll::poll_once(&client, &backoff, &mut nodes);
        info!("Single poll finished: {} node(s), {} failed", nodes.len(), failed);
        return Ok(());
    }
    info!(
        "Starting poll loop: nodes={}, interval={}s",
        nodes.len(),
        cfg.poll_interval.as_secs()
    );
    poll::run_loop(&client, &backoff, &mut nodes, cfg.poll_interval)
}

fn configure_env(env_file: Option<&Path>) -> Result<Option<LoadedEnvFile>, String> {
    if let Some(path) = env_file {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        load_env_file(path)?;
        Ok(Some(LoadedEnvFile {
            path: path.to_path_buf(),
            explicit: true,
        }))
    } else {
        let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
        let default_path = cwd.join(".env");
        if default_path.is_file() {
            load_env_file(&default_path)?;
            Ok(Some(LoadedEnvFile {
                path: default_path,
                explicit: false,
            }))
        } else {
            Ok(None)
        }
    }
}

/// Merge `KEY=value` lines into the process environment without overriding
/// variables that are already set.
fn load_env_file(path: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    for (index, line) in contents.lines().enumerate() {
        let Some((key, value)) =
            parse_env_assignment(line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?
        else {
            continue;
        };
        if std::env::var_os(&key).is_none() {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

/// One `.env` line: blank lines and `#` comments are skipped, an `export `
/// prefix is allowed, and a value wrapped in matching quotes is taken verbatim.
fn parse_env_assignment(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(format!("invalid environment variable name: {:?}", key));
    }

    let raw = raw.trim();
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let inner = &raw[1..];
            let close = inner.find(q).ok_or_else(|| format!("unterminated {} quoted value", q))?;
            let rest = inner[close + 1..].trim();
            if !rest.is_empty() && !rest.starts_with('#') {
                return Err("unexpected characters after closing quote".to_string());
            }
            inner[..close].to_string()
        }
        _ => raw.split('#').next().unwrap_or_default().trim_end().to_string(),
    };
    Ok(Some((key.to_string(), value)))
}

fn main() {
    let cli = Cli::parse();
    let loaded_env = match configure_env(cli.env_file.as_deref()) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    info!(
        "honeywell-home-bridge {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(&cli) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
