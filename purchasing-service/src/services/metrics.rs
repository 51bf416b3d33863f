//! Prometheus metrics for purchasing-service.
//!
//! Two sources feed `/metrics`: the `metrics`-facade recorder that the shared
//! request middleware records into, and this crate's own prometheus statics.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Line replace-set saves by document type.
pub static LINE_SAVES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "purchasing_line_saves_total",
        "Total number of document line saves",
        &["document_type"]
    )
    .expect("Failed to register line_saves_total")
});

/// Settlement instructions issued by mode.
pub static PAYMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "purchasing_payments_total",
        "Total number of settlement instructions issued",
        &["mode"] // standard, personal, financing
    )
    .expect("Failed to register payments_total")
});

/// Settlement requests rejected before reaching the ledger.
pub static SETTLEMENT_REJECTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "purchasing_settlement_rejections_total",
        "Total number of locally rejected settlement requests",
        &["reason"]
    )
    .expect("Failed to register settlement_rejections_total")
});

/// Ledger call duration histogram.
pub static LEDGER_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "purchasing_ledger_call_duration_seconds",
        "Settlement ledger call duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register ledger_call_duration")
});

/// Initialize all metrics (forces lazy initialization) and install the
/// facade recorder for the request middleware.
///
/// The recorder is process-global; tests build several applications in one
/// process, so a second installation is a no-op.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_none() {
        if let Ok(handle) = PrometheusBuilder::new().install_recorder() {
            let _ = METRICS_HANDLE.set(handle);
        }
    }

    Lazy::force(&LINE_SAVES_TOTAL);
    Lazy::force(&PAYMENTS_TOTAL);
    Lazy::force(&SETTLEMENT_REJECTIONS_TOTAL);
    Lazy::force(&LEDGER_CALL_DURATION);
}

/// Get metrics in Prometheus text format: the recorder's request metrics
/// followed by the crate's own statics.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    if let Ok(custom) = encoder.encode_to_string(&metric_families) {
        output.push_str(&custom);
    }
    output
}
