//! Prometheus metrics for monitoring server health and match activity.
//!
//! Metrics are exposed in Prometheus text format on a separate listener, enabled by
//! `METRICS_BIND`. Without an installed exporter every recording call is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts by method and status
//! - **WebSocket Metrics**: Active and total connections
//! - **Game Metrics**: Active rooms, drop rulings, finished matches
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::drops_total("accepted");
//! metrics::active_rooms(4);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

pub fn websocket_connection_opened() {
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

pub fn websocket_connection_closed() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Set current active rooms count.
pub fn active_rooms(count: usize) {
    metrics::gauge!("active_rooms").set(count as f64);
}

/// Count a drop ruling, labelled `accepted` or `rejected`.
pub fn drops_total(result: &'static str) {
    metrics::counter!("drops_total", "result" => result).increment(1);
}

/// Count a finished match, labelled `won` or `draw`.
pub fn games_finished_total(result: &'static str) {
    metrics::counter!("games_finished_total", "result" => result).increment(1);
}
