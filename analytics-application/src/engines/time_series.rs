use analytics_domain::services::resample_hourly;
use analytics_domain::{AnalysisError, EnrichedRecord, TIME_SERIES};

use super::{AnalysisEngine, Artifact};

pub struct TimeSeriesEngine {
    window: usize,
    max_hours: usize,
}

impl TimeSeriesEngine {
    pub fn new(window: usize, max_hours: usize) -> Self {
        Self { window, max_hours }
    }
}

impl AnalysisEngine for TimeSeriesEngine {
    fn name(&self) -> &'static str {
        "time_series"
    }

    fn artifact_names(&self) -> &'static [&'static str] {
        &[TIME_SERIES]
    }

    fn run(&self, records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError> {
        Ok(vec![Artifact::new(
            TIME_SERIES,
            &resample_hourly(records, self.window, self.max_hours)?,
        )?])
    }
}
