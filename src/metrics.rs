//! Catalog counters.
//!
//! Recorded through the `metrics` facade; they are no-ops until the host
//! application installs a recorder.

macro_rules! catalog_metric {
    ($name:literal) => {
        concat!("pokedex_catalog_", $name)
    };
}

/// Upstream failure kinds that label `upstream_errors_total`
const UPSTREAM_ERROR_KINDS: [&str; 3] = ["not_found", "transport", "decode"];

/// Metrics for cache-first lookups and bulk imports
pub struct CatalogMetrics;

impl CatalogMetrics {
    pub fn record_cache_hit() {
        ::metrics::counter!(catalog_metric!("cache_hits_total")).increment(1);
    }

    pub fn record_cache_miss() {
        ::metrics::counter!(catalog_metric!("cache_misses_total")).increment(1);
    }

    pub fn record_upstream_error(kind: &'static str) {
        ::metrics::counter!(catalog_metric!("upstream_errors_total"), "kind" => kind)
            .increment(1);
    }

    pub fn record_skipped_elements(count: usize) {
        ::metrics::counter!(catalog_metric!("skipped_elements_total")).increment(count as u64);
    }

    pub fn record_import(imported: usize, failed: usize) {
        ::metrics::counter!(catalog_metric!("imported_total")).increment(imported as u64);
        ::metrics::counter!(catalog_metric!("import_failures_total")).increment(failed as u64);
    }

    /// Pre-registers every counter so exporters list them before first use
    pub fn register_metrics() {
        let _ = ::metrics::counter!(catalog_metric!("cache_hits_total"));
        let _ = ::metrics::counter!(catalog_metric!("cache_misses_total"));
        for kind in UPSTREAM_ERROR_KINDS {
            let _ = ::metrics::counter!(catalog_metric!("upstream_errors_total"), "kind" => kind);
        }
        let _ = ::metrics::counter!(catalog_metric!("skipped_elements_total"));
        let _ = ::metrics::counter!(catalog_metric!("imported_total"));
        let _ = ::metrics::counter!(catalog_metric!("import_failures_total"));
    }
}
