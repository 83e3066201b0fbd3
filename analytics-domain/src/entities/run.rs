// Run manifest entity
// What one pipeline pass loaded, dropped, resolved and wrote

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineFailure {
    pub engine: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub geo_lookups: u64,
    pub geo_lookup_failures: u64,
    pub artifacts_written: u64,
    pub engine_failures: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub records_loaded: u64,
    pub records_enriched: u64,
    pub dropped_invalid_ip: u64,
    pub dropped_invalid_timestamp: u64,
    pub unmatched_geo: u64,
    pub unique_ips: u64,
    pub artifacts: Vec<String>,
    pub failures: Vec<EngineFailure>,
    pub metrics: MetricsSnapshot,
}
