//! Prometheus metrics for the relay.
//!
//! - Trigger outcomes (ignored, malformed, unresolved, delivered, failed)
//! - Push send latency and failures by kind
//! - Trigger cleanups and document store errors

mod helpers;

pub use helpers::{encode_metrics, PushMetrics, RelayMetrics, StoreMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "relay";

lazy_static! {
    // ============================================================================
    // Trigger Metrics
    // ============================================================================

    /// Trigger events handled, by outcome
    pub static ref EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_events_total", METRIC_PREFIX),
        "Trigger events handled by outcome",
        &["outcome"]
    ).unwrap();

    /// Trigger documents deleted after a confirmed send
    pub static ref TRIGGER_CLEANUPS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_trigger_cleanups_total", METRIC_PREFIX),
        "Trigger documents deleted after successful delivery"
    ).unwrap();

    // ============================================================================
    // Push Metrics
    // ============================================================================

    /// Push gateway round-trip time
    pub static ref PUSH_SEND_DURATION: Histogram = register_histogram!(
        format!("{}_push_send_duration_seconds", METRIC_PREFIX),
        "Push gateway send latency in seconds",
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Failed push sends, by error kind
    pub static ref PUSH_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_push_failures_total", METRIC_PREFIX),
        "Failed push sends by error kind",
        &["kind"]
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Document store errors, by operation
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_store_errors_total", METRIC_PREFIX),
        "Document store errors by operation",
        &["operation"]
    ).unwrap();
}
