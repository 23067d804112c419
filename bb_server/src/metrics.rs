//! Prometheus metrics for monitoring betting server health and performance.
//!
//! This module provides metrics collection and export via the `/metrics` endpoint.
//! Metrics are exposed in Prometheus text format for scraping by monitoring systems.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Wallet Metrics**: Deposits, withdrawals, winnings, stake flow
//! - **Bet Metrics**: Tickets placed, legs recorded
//! - **Database Metrics**: Connection pool status
//! - **Auth Metrics**: Login attempts, OTP issuance
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bb_server::metrics;
//! use std::net::SocketAddr;
//!
//! // Initialize metrics exporter
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! // Record HTTP request
//! metrics::http_requests_total("POST", "/api/login", 200);
//!
//! // Record a placed ticket
//! metrics::bets_placed_total();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
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
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Wallet Metrics
// ============================================================================

/// Increment deposits counter.
pub fn deposits_total() {
    metrics::counter!("deposits_total").increment(1);
}

/// Increment withdrawals counter.
pub fn withdrawals_total() {
    metrics::counter!("withdrawals_total").increment(1);
}

/// Increment winnings counter.
pub fn winnings_total() {
    metrics::counter!("winnings_total").increment(1);
}

/// Record stake size distribution in minor units.
pub fn stake_minor_units(stake: i64) {
    metrics::histogram!("stake_minor_units").record(stake as f64);
}

// ============================================================================
// Bet Metrics
// ============================================================================

/// Increment placed tickets counter.
pub fn bets_placed_total() {
    metrics::counter!("bets_placed_total").increment(1);
}

/// Increment recorded legs counter.
pub fn bet_legs_total(count: u64) {
    metrics::counter!("bet_legs_total").increment(count);
}

/// Increment deleted tickets counter.
pub fn bets_deleted_total() {
    metrics::counter!("bets_deleted_total").increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Set current database connection pool size.
pub fn db_connections_active(count: u32) {
    metrics::gauge!("db_connections_active").set(count as f64);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment issued OTP counter.
pub fn otp_issued_total() {
    metrics::counter!("otp_issued_total").increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
