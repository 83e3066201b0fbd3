use analytics_domain::services::KMeans;
use analytics_domain::{AnalysisError, ClusterSummary, EnrichedRecord, FeatureVector, CLUSTERS};

use super::{AnalysisEngine, Artifact};

pub struct ClusteringEngine {
    model: KMeans,
}

impl ClusteringEngine {
    pub fn new(cluster_count: usize, n_init: usize, seed: u64) -> Self {
        Self {
            model: KMeans::new(cluster_count, n_init, seed),
        }
    }
}

impl AnalysisEngine for ClusteringEngine {
    fn name(&self) -> &'static str {
        "clustering"
    }

    fn artifact_names(&self) -> &'static [&'static str] {
        &[CLUSTERS]
    }

    fn run(&self, records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError> {
        let features: Vec<FeatureVector> = records.iter().map(EnrichedRecord::features).collect();
        let fit = self.model.fit(&features)?;
        let summary = ClusterSummary {
            clusters: fit.cluster_counts(),
        };
        Ok(vec![Artifact::new(CLUSTERS, &summary)?])
    }
}
