// Runtime configuration handed to the pipeline
// Resolved once at startup and never mutated during a run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub output_dir: String,
    pub geo_base_url: String,
    pub geo_api_token: Option<String>,
    pub geo_request_interval_ms: u64,
    pub geo_concurrency: usize,
    pub geo_timeout_seconds: u64,
    pub top_countries: usize,
    pub cluster_count: usize,
    pub kmeans_n_init: usize,
    pub contamination: f64,
    pub isolation_trees: usize,
    pub random_seed: u64,
    pub rolling_window: usize,
    pub max_series_hours: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            output_dir: "./static/charts".to_string(),
            geo_base_url: "https://ipinfo.io".to_string(),
            geo_api_token: None,
            geo_request_interval_ms: 100,
            geo_concurrency: 4,
            geo_timeout_seconds: 10,
            top_countries: 10,
            cluster_count: 3,
            kmeans_n_init: 10,
            contamination: 0.1,
            isolation_trees: 100,
            random_seed: 42,
            rolling_window: 3,
            // One leap year of hourly buckets.
            max_series_hours: 8784,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub visits_table: String,
}
