/// Metrics and telemetry for the CPF verifier
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Verification outcomes
/// - Cache hit/miss rates
/// - Remote verification latency
/// - Store connectivity

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Duration;

lazy_static! {
    /// Verification requests by terminal outcome
    pub static ref VERIFICATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cpf_verifications_total",
        "Total number of CPF verification requests by outcome",
        &["outcome"]
    )
    .expect("cpf_verifications_total registers");

    /// Lookups answered from the store
    pub static ref CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        "cache_hits_total",
        "Total number of verification cache hits"
    )
    .expect("cache_hits_total registers");

    /// Lookups that went to the remote service
    pub static ref CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        "cache_misses_total",
        "Total number of verification cache misses"
    )
    .expect("cache_misses_total registers");

    /// Remote verification latency in seconds
    pub static ref REMOTE_VERIFICATION_DURATION_SECONDS: Histogram = register_histogram!(
        "remote_verification_duration_seconds",
        "Remote CPF verification latencies in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]
    )
    .expect("remote_verification_duration_seconds registers");

    /// 1 while the store is connected
    pub static ref STORE_CONNECTED: IntGauge = register_int_gauge!(
        "store_connected",
        "Whether the verification store is connected (1) or not (0)"
    )
    .expect("store_connected registers");
}

/// Render all metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a terminal verification outcome
pub fn record_verification(outcome: &str) {
    VERIFICATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a store lookup
pub fn record_cache_access(hit: bool) {
    if hit {
        CACHE_HITS_TOTAL.inc();
    } else {
        CACHE_MISSES_TOTAL.inc();
    }
}

/// Record the duration of a remote call, successful or not
pub fn record_remote_call(duration: Duration) {
    REMOTE_VERIFICATION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_verification() {
        record_verification("fresh");
        let metrics = render_metrics();
        assert!(metrics.contains("cpf_verifications_total"));
        assert!(metrics.contains("outcome=\"fresh\""));
    }

    #[test]
    fn test_record_cache_access() {
        let hits = CACHE_HITS_TOTAL.get();
        let misses = CACHE_MISSES_TOTAL.get();

        record_cache_access(true);
        record_cache_access(false);

        assert!(CACHE_HITS_TOTAL.get() > hits);
        assert!(CACHE_MISSES_TOTAL.get() > misses);

        let metrics = render_metrics();
        assert!(metrics.contains("cache_hits_total"));
        assert!(metrics.contains("cache_misses_total"));
    }

    #[test]
    fn test_record_remote_call() {
        record_remote_call(Duration::from_millis(250));
        let metrics = render_metrics();
        assert!(metrics.contains("remote_verification_duration_seconds"));
    }
}
