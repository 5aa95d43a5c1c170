//! Metrics instrumentation for the eviction engine.
//!
//! Uses the `metrics` crate for backend-agnostic collection; the embedding
//! application chooses the exporter.
//!
//! # Metric Naming Convention
//! - `eviction_engine_` prefix for all metrics
//! - `_total` suffix for counters
//!
//! # Labels
//! - `phase`: pre_init, post_init

use metrics::{counter, gauge};

/// Set the number of policies held by the resolved registry
pub fn set_registered_policies(count: usize) {
    gauge!("eviction_engine_registered_policies").set(count as f64);
}

/// Record policies applied to one target during a lifecycle phase
pub fn record_policies_applied(phase: &str, count: usize) {
    counter!(
        "eviction_engine_policies_applied_total",
        "phase" => phase.to_string()
    )
    .increment(count as u64);
}

/// Record the outcome of the post-init sweep
pub fn record_sweep(regions: usize, changed: usize) {
    counter!(
        "eviction_engine_regions_swept_total",
        "phase" => "post_init"
    )
    .increment(regions as u64);
    counter!(
        "eviction_engine_regions_changed_total",
        "phase" => "post_init"
    )
    .increment(changed as u64);
}
