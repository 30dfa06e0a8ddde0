//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    EVENTS_TOTAL, PUSH_FAILURES_TOTAL, PUSH_SEND_DURATION, STORE_ERRORS_TOTAL,
    TRIGGER_CLEANUPS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording trigger outcomes
pub struct RelayMetrics;

impl RelayMetrics {
    /// Record a handled trigger by outcome label
    pub fn record_outcome(outcome: &str) {
        EVENTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a trigger document removed after delivery
    pub fn record_cleanup() {
        TRIGGER_CLEANUPS_TOTAL.inc();
    }
}

/// Helper struct for recording push gateway metrics
pub struct PushMetrics;

impl PushMetrics {
    pub fn record_send_duration(elapsed: Duration) {
        PUSH_SEND_DURATION.observe(elapsed.as_secs_f64());
    }

    pub fn record_failure(kind: &str) {
        PUSH_FAILURES_TOTAL.with_label_values(&[kind]).inc();
    }
}

/// Helper struct for recording document store metrics
pub struct StoreMetrics;

impl StoreMetrics {
    pub fn record_error(operation: &str) {
        STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }
}
