//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_http_requests_total` (counter): requests by method, route, status
//! - `wallet_http_request_duration_seconds` (histogram): latency distribution
//! - `wallet_auth_events_total` (counter): signup/login/logout outcomes
//! - `wallet_transfers_total` (counter): ledger and on-chain transfers by outcome
//! - `wallet_chain_health` (gauge): 1=reachable, 0=unreachable
//! - `wallet_revoked_tokens` (gauge): size of the revocation list
//!
//! Recording is a no-op until a recorder is installed, so unit tests never
//! need to set one up.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("wallet_http_requests_total", &labels).increment(1);
    histogram!("wallet_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_event(event: &'static str, outcome: &'static str) {
    counter!("wallet_auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

pub fn record_transfer(kind: &'static str, outcome: &'static str) {
    counter!("wallet_transfers_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_chain_health(healthy: bool) {
    gauge!("wallet_chain_health").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_revoked_tokens(count: usize) {
    gauge!("wallet_revoked_tokens").set(count as f64);
}
