use analytics_domain::services::{
    country_distribution, device_by_country, traffic_summary, visitor_map,
};
use analytics_domain::{
    AnalysisError, EnrichedRecord, COUNTRY_DISTRIBUTION, DEVICE_BY_COUNTRY, TRAFFIC_SUMMARY,
    VISITOR_MAP,
};

use super::{AnalysisEngine, Artifact};

pub struct AggregateReporter {
    top_countries: usize,
}

impl AggregateReporter {
    pub fn new(top_countries: usize) -> Self {
        Self { top_countries }
    }
}

impl AnalysisEngine for AggregateReporter {
    fn name(&self) -> &'static str {
        "aggregates"
    }

    fn artifact_names(&self) -> &'static [&'static str] {
        &[COUNTRY_DISTRIBUTION, DEVICE_BY_COUNTRY, VISITOR_MAP, TRAFFIC_SUMMARY]
    }

    fn run(&self, records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError> {
        Ok(vec![
            Artifact::new(
                COUNTRY_DISTRIBUTION,
                &country_distribution(records, self.top_countries),
            )?,
            Artifact::new(
                DEVICE_BY_COUNTRY,
                &device_by_country(records, self.top_countries),
            )?,
            Artifact::new(VISITOR_MAP, &visitor_map(records))?,
            Artifact::new(TRAFFIC_SUMMARY, &traffic_summary(records))?,
        ])
    }
}
