//! Metrics collection.
//!
//! # Metrics
//! - `route_discovery_runs_total` (counter): discovery runs by outcome
//! - `route_discovery_duration_seconds` (histogram): wall time of a run
//! - `route_discovery_routes` (gauge): routes found by the last successful run
//! - `route_module_loads_total` (counter): module loads by outcome

use std::time::Instant;

/// Record a finished discovery run.
pub fn record_discovery(outcome: &'static str, start: Instant, routes: usize) {
    ::metrics::counter!("route_discovery_runs_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("route_discovery_duration_seconds")
        .record(start.elapsed().as_secs_f64());
    if outcome == "success" {
        ::metrics::gauge!("route_discovery_routes").set(routes as f64);
    }
}

/// Record one module load attempt: "found", "not_found" or "error".
pub fn record_module_load(outcome: &'static str) {
    ::metrics::counter!("route_module_loads_total", "outcome" => outcome).increment(1);
}
