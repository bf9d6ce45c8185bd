// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the midonet-kube controller.
//!
//! All metrics carry the namespace prefix `midonet_kube_`.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliations per Kubernetes kind and their outcomes
//! - **Backend Metrics** - Track MidoNet API requests and deleted backend objects
//! - **Retry Metrics** - Track keys scheduled for re-delivery
//!
//! # Example
//!
//! ```rust,no_run
//! use midonet_kube::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("Pod", std::time::Duration::from_millis(20));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all controller metrics
const METRICS_NAMESPACE: &str = "midonet_kube";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by kind and status
///
/// Labels:
/// - `kind`: Kubernetes kind (`Node`, `Pod`, `Service`, `Endpoints`)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by kind and status",
    );
    let counter = CounterVec::new(opts, &["kind", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `kind`: Kubernetes kind
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by kind",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of keys scheduled for re-delivery
///
/// Labels:
/// - `kind`: Kubernetes kind
/// - `reason`: Error reason (`DependencyNotReady`, `ParentNotReady`, `TransportError`)
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of re-deliveries by kind and reason",
    );
    let counter = CounterVec::new(opts, &["kind", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Backend Metrics
// ============================================================================

/// Total number of MidoNet API requests
///
/// Labels:
/// - `method`: HTTP method
/// - `resource`: MidoNet kind
/// - `status`: HTTP status code, or `transport_error`
pub static BACKEND_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_backend_requests_total"),
        "Total number of MidoNet API requests by method, resource and status",
    );
    let counter = CounterVec::new(opts, &["method", "resource", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of backend objects deleted
///
/// Labels:
/// - `resource`: MidoNet kind
pub static BACKEND_RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_backend_resources_deleted_total"),
        "Total number of MidoNet objects deleted by resource",
    );
    let counter = CounterVec::new(opts, &["resource"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
///
/// # Arguments
/// * `kind` - The Kubernetes kind reconciled (e.g., `Pod`)
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(kind: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `kind` - The Kubernetes kind reconciled
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(kind: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a key scheduled for re-delivery
///
/// # Arguments
/// * `kind` - The Kubernetes kind
/// * `reason` - Error reason that caused the requeue
pub fn record_reconciliation_requeue(kind: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "requeue"])
        .inc();
    REQUEUE_TOTAL.with_label_values(&[kind, reason]).inc();
}

/// Record a MidoNet API request
///
/// # Arguments
/// * `method` - HTTP method
/// * `resource` - MidoNet kind
/// * `status` - HTTP status code or `transport_error`
pub fn record_backend_request(method: &str, resource: &str, status: &str) {
    BACKEND_REQUESTS_TOTAL
        .with_label_values(&[method, resource, status])
        .inc();
}

/// Record a backend object deletion
pub fn record_resource_deleted(resource: &str) {
    BACKEND_RESOURCES_DELETED_TOTAL
        .with_label_values(&[resource])
        .inc();
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
