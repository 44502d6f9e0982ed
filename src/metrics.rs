// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for dnsource.
//!
//! This module provides metrics collection with the namespace prefix
//! `dnsource_firestoned_io_` (prometheus-safe version of "dnsource.firestoned.io").
//!
//! # Metrics Categories
//!
//! - **Merge Metrics** - Endpoints produced by the merge engine and CNAME conflicts
//! - **Filter Metrics** - Endpoints and targets removed by the wrappers
//! - **Source Metrics** - Duration and size of a full source render
//!
//! # Example
//!
//! ```rust,no_run
//! use dnsource::metrics::{gather_metrics, record_cname_conflict};
//!
//! record_cname_conflict();
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all dnsource metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "dnsource_firestoned_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Merge Metrics
// ============================================================================

/// Total number of endpoints emitted by the merge engine
pub static ENDPOINTS_MERGED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_endpoints_merged_total"),
        "Total number of endpoints emitted by the merge engine",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of names with conflicting CNAME targets
pub static CNAME_CONFLICTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_cname_conflicts_total"),
        "Total number of DNS names with more than one distinct CNAME target",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Filter Metrics
// ============================================================================

/// Total number of endpoints dropped
///
/// Labels:
/// - `reason`: Why the endpoint was dropped (`empty_cname`, `invalid`, `duplicate`, ...)
pub static ENDPOINTS_DROPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_endpoints_dropped_total"),
        "Total number of endpoints dropped by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of individual targets removed by the target filter
///
/// Labels:
/// - `reason`: `excluded_net` or `not_included`
pub static TARGETS_FILTERED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_targets_filtered_total"),
        "Total number of targets removed by the target filter by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Source Metrics
// ============================================================================

/// Duration of a full source render in seconds
///
/// Labels:
/// - `source`: Name of the rendered source chain
pub static SOURCE_RENDER_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_source_render_duration_seconds"),
        "Duration of a full endpoint render by source",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]);
    let histogram = HistogramVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Number of endpoints produced by the last render
///
/// Labels:
/// - `source`: Name of the rendered source chain
pub static SOURCE_ENDPOINTS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_source_endpoints"),
        "Number of endpoints produced by the last render by source",
    );
    let gauge = GaugeVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the number of endpoints emitted by one merge
pub fn record_endpoints_merged(count: usize) {
    ENDPOINTS_MERGED_TOTAL.inc_by(count as u64);
}

/// Record a DNS name with conflicting CNAME targets
pub fn record_cname_conflict() {
    CNAME_CONFLICTS_TOTAL.inc();
}

/// Record a dropped endpoint
///
/// # Arguments
/// * `reason` - Drop reason, one of the `DROP_REASON_*` constants
pub fn record_endpoint_dropped(reason: &str) {
    ENDPOINTS_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}

/// Record a target removed by the target filter
///
/// # Arguments
/// * `reason` - One of the `FILTER_REASON_*` constants
pub fn record_target_filtered(reason: &str) {
    TARGETS_FILTERED_TOTAL.with_label_values(&[reason]).inc();
}

/// Record a completed render of a source chain
///
/// # Arguments
/// * `source` - Name of the source chain
/// * `duration` - How long the render took
/// * `endpoints` - Number of endpoints produced
#[allow(clippy::cast_precision_loss)]
pub fn record_source_render(source: &str, duration: Duration, endpoints: usize) {
    SOURCE_RENDER_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration.as_secs_f64());
    SOURCE_ENDPOINTS
        .with_label_values(&[source])
        .set(endpoints as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
