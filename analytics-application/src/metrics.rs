use std::sync::atomic::{AtomicU64, Ordering};

use analytics_domain::MetricsSnapshot;

#[derive(Debug, Default)]
pub struct Metrics {
    geo_lookups: AtomicU64,
    geo_lookup_failures: AtomicU64,
    artifacts_written: AtomicU64,
    engine_failures: AtomicU64,
}

impl Metrics {
    pub fn record_lookup(&self, succeeded: bool) {
        self.geo_lookups.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.geo_lookup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_artifact(&self) {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_engine_failure(&self) {
        self.engine_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            geo_lookups: self.geo_lookups.load(Ordering::Relaxed),
            geo_lookup_failures: self.geo_lookup_failures.load(Ordering::Relaxed),
            artifacts_written: self.artifacts_written.load(Ordering::Relaxed),
            engine_failures: self.engine_failures.load(Ordering::Relaxed),
        }
    }
}
