//! Prometheus metrics for the zone directory
//!
//! This module provides metrics tracking for:
//! - Refresh cycles: outcome, duration, current zone count
//! - Page fetches: failures by kind
//! - Liveness probes: outcomes
//!
//! Failures that the directory swallows (failed pages, failed probes) are
//! recorded here so they stay observable.
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_gauge, register_histogram, CounterVec, Encoder, Gauge,
    Histogram, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all directory metrics
struct DirectoryMetrics {
    refresh_cycles: CounterVec,
    refresh_duration: Histogram,
    zones: Gauge,
    page_fetch_failures: CounterVec,
    probes: CounterVec,
}

/// Global storage for directory metrics
static DIRECTORY_METRICS: OnceLock<DirectoryMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Outcome of a liveness probe, as recorded in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Alive,
    Dead,
    /// Probing disabled; zone reported alive without a network call
    Skipped,
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Skipped => "skipped",
        }
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = DirectoryMetrics {
        refresh_cycles: register_counter_vec!(
            "zonedir_refresh_cycles_total",
            "Total refresh cycles by outcome",
            &["outcome"]
        )?,
        refresh_duration: register_histogram!(
            "zonedir_refresh_duration_seconds",
            "Time spent assembling a snapshot in seconds",
            vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]
        )?,
        zones: register_gauge!(
            "zonedir_zones",
            "Number of zones in the current snapshot"
        )?,
        page_fetch_failures: register_counter_vec!(
            "zonedir_page_fetch_failures_total",
            "Total failed zone page fetches by failure kind",
            &["kind"]
        )?,
        probes: register_counter_vec!(
            "zonedir_probes_total",
            "Total liveness probes by outcome",
            &["outcome"]
        )?,
    };

    DIRECTORY_METRICS
        .set(metrics)
        .map_err(|_| "Directory metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a completed refresh cycle
pub fn record_refresh(duration_secs: f64, zones: usize, truncated: bool) {
    let Some(m) = DIRECTORY_METRICS.get() else {
        return;
    };

    let outcome = if truncated { "truncated" } else { "complete" };
    m.refresh_cycles.with_label_values(&[outcome]).inc();
    m.refresh_duration.observe(duration_secs);
    m.zones.set(zones as f64);
}

/// Record a failed page fetch
pub fn record_page_failure(kind: &str) {
    if let Some(m) = DIRECTORY_METRICS.get() {
        m.page_fetch_failures.with_label_values(&[kind]).inc();
    }
}

/// Record a probe outcome
pub fn record_probe(outcome: ProbeOutcome) {
    if let Some(m) = DIRECTORY_METRICS.get() {
        m.probes.with_label_values(&[outcome.as_str()]).inc();
    }
}

// ============================================================================
// Tests
// ============================================================================
