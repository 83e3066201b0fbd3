use std::collections::HashSet;

use chrono::{Datelike, Timelike};

use crate::entities::{EnrichedRecord, GeoInfo, GeoTable, VisitRecord};
use crate::utils::parse_visit_timestamp;
use crate::value_objects::DeviceType;

#[derive(Debug, Default)]
pub struct FeatureOutcome {
    pub records: Vec<EnrichedRecord>,
    pub dropped_invalid_ip: u64,
    pub dropped_invalid_timestamp: u64,
    pub unmatched_geo: u64,
}

/// Distinct usable addresses in first-encountered order.
pub fn unique_valid_ips(records: &[VisitRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        if let Some(ip) = record.valid_ip() {
            if seen.insert(ip) {
                out.push(ip.to_string());
            }
        }
    }
    out
}

pub fn build_enriched(records: &[VisitRecord], geo: &GeoTable) -> FeatureOutcome {
    let mut outcome = FeatureOutcome::default();
    for record in records {
        let Some(ip) = record.valid_ip() else {
            outcome.dropped_invalid_ip += 1;
            continue;
        };
        let Some(visited_at) = record
            .visited_at
            .as_deref()
            .and_then(parse_visit_timestamp)
        else {
            outcome.dropped_invalid_timestamp += 1;
            continue;
        };

        let geo_info = match geo.get(ip) {
            Some(info) => info.clone(),
            None => {
                outcome.unmatched_geo += 1;
                GeoInfo::sentinel(ip)
            }
        };

        let device_label = record.device_type.clone().unwrap_or_default();
        let (is_desktop, is_mobile) = DeviceType::from(device_label.as_str()).indicators();

        outcome.records.push(EnrichedRecord {
            id: record.id,
            ip_address: ip.to_string(),
            user_agent: record.user_agent.clone().unwrap_or_default(),
            device_type: device_label,
            visited_at,
            geo: geo_info,
            hour: visited_at.hour(),
            day_of_week: visited_at.weekday().num_days_from_monday(),
            is_desktop,
            is_mobile,
        });
    }
    outcome
}
