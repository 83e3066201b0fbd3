use std::sync::Arc;

use analytics_domain::ports::{ArtifactRepository, GeoLookupService, VisitRepository};
use analytics_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub visit_repo: Arc<dyn VisitRepository>,
    pub artifact_repo: Arc<dyn ArtifactRepository>,
    pub geo_lookup: Arc<dyn GeoLookupService>,
    pub metrics: Arc<Metrics>,
}
