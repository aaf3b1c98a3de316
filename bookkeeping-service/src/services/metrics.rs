//! Prometheus metrics for bookkeeping-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Entries written, by source type (no tenant label).
pub static ENTRIES_POSTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bookkeeping_entries_posted_total",
        "Total number of ledger entries written",
        &["source_type"]
    )
    .expect("Failed to register entries_posted_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bookkeeping_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Account counter by type.
pub static ACCOUNTS_CREATED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bookkeeping_accounts_created_total",
        "Total number of accounts created",
        &["account_type"]
    )
    .expect("Failed to register accounts_created")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "bookkeeping_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&ENTRIES_POSTED_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&ACCOUNTS_CREATED);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Count a failed operation under its error kind.
pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_exported() {
        init_metrics();
        ENTRIES_POSTED_TOTAL.with_label_values(&["manual"]).inc();
        record_error("validation");

        let text = get_metrics();
        assert!(text.contains("bookkeeping_entries_posted_total"));
        assert!(text.contains("bookkeeping_errors_total"));
    }
}
