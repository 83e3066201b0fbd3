use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;

use analytics_domain::{DbConfig, RuntimeConfig};

use super::validate_identifier;
use crate::utils::resolve_path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub visits_table: String,
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
    pub log_level: String,
    pub log_file: Option<String>,
    /// Config path that did not exist when defaults were used instead.
    /// Reported once logging is up.
    #[serde(skip)]
    pub missing_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "visitscope".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            visits_table: "requests".to_string(),
            output_dir: runtime.output_dir,
            geo_base_url: runtime.geo_base_url,
            geo_api_token: None,
            geo_request_interval_ms: runtime.geo_request_interval_ms,
            geo_concurrency: runtime.geo_concurrency,
            geo_timeout_seconds: runtime.geo_timeout_seconds,
            top_countries: runtime.top_countries,
            cluster_count: runtime.cluster_count,
            kmeans_n_init: runtime.kmeans_n_init,
            contamination: runtime.contamination,
            isolation_trees: runtime.isolation_trees,
            random_seed: runtime.random_seed,
            rolling_window: runtime.rolling_window,
            max_series_hours: runtime.max_series_hours,
            log_level: "info".to_string(),
            log_file: None,
            missing_file: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("VISITSCOPE_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?
        } else {
            AppConfig {
                missing_file: Some(file_path.to_path_buf()),
                ..AppConfig::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        for value in [
            &mut self.clickhouse_user,
            &mut self.clickhouse_password,
            &mut self.geo_api_token,
            &mut self.log_file,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        self.geo_base_url = self.geo_base_url.trim().trim_end_matches('/').to_string();
        if self.log_level.trim().is_empty() {
            self.log_level = "info".to_string();
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.output_dir = resolve_path(base, &self.output_dir);
        if let Some(log_file) = &self.log_file {
            self.log_file = Some(resolve_path(base, log_file));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.clickhouse_url.trim().is_empty() {
            return Err(anyhow!("clickhouse_url must not be empty"));
        }
        validate_identifier("clickhouse_database", &self.clickhouse_database)?;
        validate_identifier("visits_table", &self.visits_table)?;
        if self.output_dir.trim().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }
        if !(self.geo_base_url.starts_with("http://") || self.geo_base_url.starts_with("https://")) {
            return Err(anyhow!("geo_base_url must be an http(s) url"));
        }
        if self.geo_concurrency == 0 || self.geo_timeout_seconds == 0 {
            return Err(anyhow!("geo_concurrency and geo_timeout_seconds must be greater than 0"));
        }
        if self.top_countries == 0 || self.rolling_window == 0 || self.max_series_hours == 0 {
            return Err(anyhow!(
                "top_countries, rolling_window and max_series_hours must be greater than 0"
            ));
        }
        if self.cluster_count == 0 || self.kmeans_n_init == 0 || self.isolation_trees == 0 {
            return Err(anyhow!(
                "cluster_count, kmeans_n_init and isolation_trees must be greater than 0"
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(anyhow!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            ));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            output_dir: self.output_dir.clone(),
            geo_base_url: self.geo_base_url.clone(),
            geo_api_token: self.geo_api_token.clone(),
            geo_request_interval_ms: self.geo_request_interval_ms,
            geo_concurrency: self.geo_concurrency,
            geo_timeout_seconds: self.geo_timeout_seconds,
            top_countries: self.top_countries,
            cluster_count: self.cluster_count,
            kmeans_n_init: self.kmeans_n_init,
            contamination: self.contamination,
            isolation_trees: self.isolation_trees,
            random_seed: self.random_seed,
            rolling_window: self.rolling_window,
            max_series_hours: self.max_series_hours,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
            visits_table: self.visits_table.clone(),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("VISITSCOPE_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Some(value) = lookup("VISITSCOPE_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Some(value) = lookup("VISITSCOPE_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Some(value) = lookup("VISITSCOPE_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Some(value) = lookup("VISITSCOPE_VISITS_TABLE") {
            self.visits_table = value;
        }
        if let Some(value) = lookup("VISITSCOPE_OUTPUT_DIR") {
            self.output_dir = value;
        }
        if let Some(value) = lookup("VISITSCOPE_GEO_BASE_URL") {
            self.geo_base_url = value;
        }
        // Legacy variable only fills a token the config left unset.
        if self.geo_api_token.is_none() {
            self.geo_api_token = lookup("IPINFO_TOKEN");
        }
        if let Some(value) = lookup("VISITSCOPE_IPINFO_TOKEN") {
            self.geo_api_token = Some(value);
        }
        if let Some(value) = lookup("VISITSCOPE_GEO_REQUEST_INTERVAL_MS") {
            self.geo_request_interval_ms = value.parse().unwrap_or(self.geo_request_interval_ms);
        }
        if let Some(value) = lookup("VISITSCOPE_GEO_CONCURRENCY") {
            self.geo_concurrency = value.parse().unwrap_or(self.geo_concurrency);
        }
        if let Some(value) = lookup("VISITSCOPE_GEO_TIMEOUT_SECONDS") {
            self.geo_timeout_seconds = value.parse().unwrap_or(self.geo_timeout_seconds);
        }
        if let Some(value) = lookup("VISITSCOPE_TOP_COUNTRIES") {
            self.top_countries = value.parse().unwrap_or(self.top_countries);
        }
        if let Some(value) = lookup("VISITSCOPE_CLUSTER_COUNT") {
            self.cluster_count = value.parse().unwrap_or(self.cluster_count);
        }
        if let Some(value) = lookup("VISITSCOPE_KMEANS_N_INIT") {
            self.kmeans_n_init = value.parse().unwrap_or(self.kmeans_n_init);
        }
        if let Some(value) = lookup("VISITSCOPE_CONTAMINATION") {
            self.contamination = value.parse().unwrap_or(self.contamination);
        }
        if let Some(value) = lookup("VISITSCOPE_ISOLATION_TREES") {
            self.isolation_trees = value.parse().unwrap_or(self.isolation_trees);
        }
        if let Some(value) = lookup("VISITSCOPE_RANDOM_SEED") {
            self.random_seed = value.parse().unwrap_or(self.random_seed);
        }
        if let Some(value) = lookup("VISITSCOPE_ROLLING_WINDOW") {
            self.rolling_window = value.parse().unwrap_or(self.rolling_window);
        }
        if let Some(value) = lookup("VISITSCOPE_MAX_SERIES_HOURS") {
            self.max_series_hours = value.parse().unwrap_or(self.max_series_hours);
        }
        if let Some(value) = lookup("VISITSCOPE_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("VISITSCOPE_LOG_FILE") {
            self.log_file = Some(value);
        }
    }
}
