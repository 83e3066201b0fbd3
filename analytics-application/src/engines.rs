// Analysis engines
// Each engine turns the frozen enriched table into one or more named artifacts

pub mod aggregates;
pub mod anomalies;
pub mod clustering;
pub mod time_series;

pub use aggregates::*;
pub use anomalies::*;
pub use clustering::*;
pub use time_series::*;

use std::sync::Arc;

use serde::Serialize;

use analytics_domain::{AnalysisError, EnrichedRecord, RuntimeConfig};

#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: &'static str,
    pub body: serde_json::Value,
}

impl Artifact {
    pub fn new<T: Serialize>(name: &'static str, body: &T) -> Result<Self, AnalysisError> {
        Ok(Self {
            name,
            body: serde_json::to_value(body)?,
        })
    }
}

/// Synchronous, CPU-bound analysis over the enriched table.
pub trait AnalysisEngine: Send + Sync {
    fn name(&self) -> &'static str;
    /// Every artifact this engine owns, written or not.
    fn artifact_names(&self) -> &'static [&'static str];
    fn run(&self, records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError>;
}

pub fn engines_for(config: &RuntimeConfig) -> Vec<Arc<dyn AnalysisEngine>> {
    let aggregates: Arc<dyn AnalysisEngine> = Arc::new(AggregateReporter::new(config.top_countries));
    let clustering: Arc<dyn AnalysisEngine> = Arc::new(ClusteringEngine::new(
        config.cluster_count,
        config.kmeans_n_init,
        config.random_seed,
    ));
    let time_series: Arc<dyn AnalysisEngine> = Arc::new(TimeSeriesEngine::new(
        config.rolling_window,
        config.max_series_hours,
    ));
    let anomalies: Arc<dyn AnalysisEngine> = Arc::new(AnomalyEngine::new(
        config.isolation_trees,
        config.contamination,
        config.random_seed,
    ));
    vec![aggregates, clustering, time_series, anomalies]
}
