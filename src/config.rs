//! Minimal runtime configuration helpers.
//! Values come from the process environment (optionally seeded from a `.env` file).

use std::time::Duration;
use std::{fs, path::Path};

use crate::translate::units::TemperatureEncoding;

pub const DEFAULT_API_BASE_URL: &str = "https://api.honeywell.com/v2";
pub const DEFAULT_POLL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Consumer key of the developer app, sent as `apikey`.
    pub client_id: String,
    /// Optional `UserRefID` header value.
    pub user_id: Option<String>,
    /// Pre-issued OAuth access token.
    pub access_token: String,
    /// Long-poll cadence.
    pub poll_interval: Duration,
    /// Encoding of room sensor temperatures.
    pub sensor_temperature_encoding: TemperatureEncoding,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = non_empty("HONEYWELL_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let client_id = non_empty("HONEYWELL_CLIENT_ID")
            .ok_or_else(|| "Missing HONEYWELL_CLIENT_ID (consumer key of the Honeywell Home developer app)".to_string())?;
        let user_id = non_empty("HONEYWELL_USER_ID");

        // Prefer env var; fallback to token.txt in working directory
        let access_token = match non_empty("HONEYWELL_ACCESS_TOKEN") {
            Some(v) => v,
            None => {
                let path = Path::new("token.txt");
                match fs::read_to_string(path) {
                    Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
                    _ => {
                        return Err(
                            "Missing access token: set HONEYWELL_ACCESS_TOKEN or provide token.txt in working directory"
                                .to_string(),
                        );
                    }
                }
            }
        };

        let poll_secs = match non_empty("POLL_INTERVAL_SECS") {
            Some(s) => match s.parse::<u64>() {
                Ok(v) if v > 0 => v,
                _ => return Err("POLL_INTERVAL_SECS must be a positive integer".to_string()),
            },
            None => DEFAULT_POLL_SECS,
        };

        let sensor_temperature_encoding = match non_empty("SENSOR_TEMPERATURE_ENCODING").as_deref() {
            None | Some("degrees") => TemperatureEncoding::Degrees,
            Some("tenths") => TemperatureEncoding::Tenths,
            Some(other) => {
                return Err(format!(
                    "SENSOR_TEMPERATURE_ENCODING must be `degrees` or `tenths`, got `{}`",
                    other
                ));
            }
        };

        Ok(Config {
            api_base_url,
            client_id,
            user_id,
            access_token,
            poll_interval: Duration::from_secs(poll_secs),
            sensor_temperature_encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[
            ("HONEYWELL_CLIENT_ID", "key"),
            ("HONEYWELL_ACCESS_TOKEN", "tok"),
        ]))
        .expect("config");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.poll_interval, Duration::from_secs(DEFAULT_POLL_SECS));
        assert_eq!(cfg.sensor_temperature_encoding, TemperatureEncoding::Degrees);
        assert_eq!(cfg.user_id, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = Config::from_lookup(lookup(&[
            ("HONEYWELL_CLIENT_ID", "key"),
            ("HONEYWELL_ACCESS_TOKEN", "tok"),
            ("HONEYWELL_USER_ID", "user-1"),
            ("POLL_INTERVAL_SECS", "300"),
            ("SENSOR_TEMPERATURE_ENCODING", "tenths"),
        ]))
        .expect("config");
        assert_eq!(cfg.user_id.as_deref(), Some("user-1"));
        assert_eq!(cfg.poll_interval, Duration::from_secs(300));
        assert_eq!(cfg.sensor_temperature_encoding, TemperatureEncoding::Tenths);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("HONEYWELL_ACCESS_TOKEN", "tok")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[
                ("HONEYWELL_CLIENT_ID", "key"),
                ("HONEYWELL_ACCESS_TOKEN", "tok"),
                ("POLL_INTERVAL_SECS", "0"),
            ]))
            .is_err()
        );
        assert!(
            Config::from_lookup(lookup(&[
                ("HONEYWELL_CLIENT_ID", "key"),
                ("HONEYWELL_ACCESS_TOKEN", "tok"),
                ("SENSOR_TEMPERATURE_ENCODING", "kelvin"),
            ]))
            .is_err()
        );
    }
}
