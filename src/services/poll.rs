use log::{error, info};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::ThermostatApi;
use crate::services::discovery::Node;
use crate::translate::state::Backoff;

/// Query every node once. Returns how many failed.
pub fn poll_once(api: &dyn ThermostatApi, backoff: &dyn Backoff, nodes: &mut [Node]) -> usize {
    let mut failed = 0;
    for node in nodes.iter_mut() {
        if let Err(e) = node.query(api, backoff) {
            error!("Poll of {} failed: {}", node.address(), e);
            failed += 1;
        }
    }
    failed
}

pub fn run_loop(
    api: &dyn ThermostatApi,
    backoff: &dyn Backoff,
    nodes: &mut [Node],
    interval: Duration,
) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("No nodes to poll".to_string());
    }
    loop {
        let tick_start = Instant::now();

        let failed = poll_once(api, backoff, nodes);
        info!(
            "Polled {} node(s), {} failed, in {:.1}s",
            nodes.len(),
            failed,
            tick_start.elapsed().as_secs_f64()
        );

        // Maintain steady cadence
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
