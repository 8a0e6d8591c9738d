//! Lightweight metrics helpers for waypost.
//!
//! Thin wrappers over the `metrics` crate macros. No exporter is embedded;
//! the application can install any compatible recorder, and without one
//! every call is a no-op.
//!
//! Provided metrics:
//! * `waypost_requests_total` (counter, labels: method, status)
//! * `waypost_dispatch_duration_seconds` (histogram, label: method)
//! * `waypost_search_cache_hits_total` (counter)
//! * `waypost_search_cache_misses_total` (counter)
use std::time::Instant;

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::Lazy;

pub const WAYPOST_REQUESTS_TOTAL: &str = "waypost_requests_total";
pub const WAYPOST_DISPATCH_DURATION_SECONDS: &str = "waypost_dispatch_duration_seconds";
pub const WAYPOST_SEARCH_CACHE_HITS_TOTAL: &str = "waypost_search_cache_hits_total";
pub const WAYPOST_SEARCH_CACHE_MISSES_TOTAL: &str = "waypost_search_cache_misses_total";

static DESCRIPTIONS: Lazy<()> = Lazy::new(|| {
    describe_counter!(
        WAYPOST_REQUESTS_TOTAL,
        Unit::Count,
        "Total number of requests dispatched, by method and final status."
    );
    describe_histogram!(
        WAYPOST_DISPATCH_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent resolving a request and running its handler."
    );
    describe_counter!(
        WAYPOST_SEARCH_CACHE_HITS_TOTAL,
        Unit::Count,
        "Route searches answered from the path cache."
    );
    describe_counter!(
        WAYPOST_SEARCH_CACHE_MISSES_TOTAL,
        Unit::Count,
        "Route searches that scanned the index."
    );
});

/// Increment the request counter for a dispatched request.
pub fn increment_request_total(method: &str, status: u16) {
    counter!(
        WAYPOST_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_dispatch_duration(method: &str, duration: std::time::Duration) {
    histogram!(WAYPOST_DISPATCH_DURATION_SECONDS, "method" => method.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    if hit {
        counter!(WAYPOST_SEARCH_CACHE_HITS_TOTAL).increment(1);
    } else {
        counter!(WAYPOST_SEARCH_CACHE_MISSES_TOTAL).increment(1);
    }
}

/// RAII helper measuring dispatch duration.
pub struct DispatchTimer {
    start: Instant,
    method: String,
}

impl DispatchTimer {
    pub fn new(method: &str) -> Self {
        Self {
            start: Instant::now(),
            method: method.to_string(),
        }
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        record_dispatch_duration(&self.method, self.start.elapsed());
    }
}

/// Register metric descriptions (idempotent).
pub fn init_metrics() -> eyre::Result<()> {
    tracing::info!("Initializing waypost metrics");
    Lazy::force(&DESCRIPTIONS);
    Ok(())
}
