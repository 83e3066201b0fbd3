use analytics_domain::services::IsolationForest;
use analytics_domain::utils::format_second;
use analytics_domain::{AnalysisError, AnomalySummary, EnrichedRecord, FeatureVector, ANOMALIES};

use super::{AnalysisEngine, Artifact};

pub struct AnomalyEngine {
    model: IsolationForest,
}

impl AnomalyEngine {
    pub fn new(n_trees: usize, contamination: f64, seed: u64) -> Self {
        Self {
            model: IsolationForest::new(n_trees, contamination, seed),
        }
    }

    pub fn summarize(&self, records: &[EnrichedRecord]) -> Result<AnomalySummary, AnalysisError> {
        let features: Vec<FeatureVector> = records.iter().map(EnrichedRecord::features).collect();
        let flags = self.model.fit_predict(&features)?;

        let mut flagged: Vec<_> = records
            .iter()
            .zip(&flags)
            .filter(|(_, flag)| **flag == 1)
            .map(|(record, _)| record.visited_at)
            .collect();
        flagged.sort();

        Ok(AnomalySummary {
            count: flagged.len() as u64,
            timestamps: flagged.iter().map(format_second).collect(),
        })
    }
}

impl AnalysisEngine for AnomalyEngine {
    fn name(&self) -> &'static str {
        "anomaly_detection"
    }

    fn artifact_names(&self) -> &'static [&'static str] {
        &[ANOMALIES]
    }

    fn run(&self, records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError> {
        Ok(vec![Artifact::new(ANOMALIES, &self.summarize(records)?)?])
    }
}

#[cfg(test)]
mod tests {
    use analytics_domain::utils::parse_visit_timestamp;
    use analytics_domain::GeoInfo;
    use chrono::Timelike;

    use super::*;

    fn record(ts: &str, is_mobile: u8) -> EnrichedRecord {
        let visited_at = parse_visit_timestamp(ts).expect("fixture");
        EnrichedRecord {
            id: 0,
            ip_address: "1.1.1.1".to_string(),
            user_agent: String::new(),
            device_type: if is_mobile == 1 { "Mobile" } else { "Desktop" }.to_string(),
            visited_at,
            geo: GeoInfo::sentinel("1.1.1.1"),
            hour: visited_at.hour(),
            day_of_week: 0,
            is_desktop: 1 - is_mobile,
            is_mobile,
        }
    }

    #[test]
    fn flags_late_night_mobile_visit_with_second_precision() {
        let mut records = Vec::new();
        for minute in 0..40 {
            records.push(record(&format!("2024-01-01T10:{:02}:00Z", minute), 0));
            records.push(record(&format!("2024-01-01T11:{:02}:30Z", minute), 0));
        }
        records.push(record("2024-01-01T03:15:42.900Z", 1));

        let summary = AnomalyEngine::new(100, 0.1, 42)
            .summarize(&records)
            .expect("summary");

        assert_eq!(summary.count, summary.timestamps.len() as u64);
        assert!(summary.timestamps.contains(&"2024-01-01 03:15:42".to_string()));
        let mut sorted = summary.timestamps.clone();
        sorted.sort();
        assert_eq!(sorted, summary.timestamps);
    }

    #[test]
    fn single_record_is_insufficient() {
        let err = AnomalyEngine::new(10, 0.1, 42)
            .run(&[record("2024-01-01T10:00:00Z", 0)])
            .expect_err("too few");
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }
}
