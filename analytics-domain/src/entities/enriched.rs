// Enriched record entity
// A visit joined with its geolocation and derived features

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::GeoInfo;

pub const FEATURE_COUNT: usize = 4;

pub type FeatureVector = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub device_type: String,
    pub visited_at: DateTime<Utc>,
    pub geo: GeoInfo,
    pub hour: u32,
    pub day_of_week: u32,
    pub is_desktop: u8,
    pub is_mobile: u8,
}

impl EnrichedRecord {
    /// `(hour, day_of_week, is_desktop, is_mobile)`, the input of both models.
    pub fn features(&self) -> FeatureVector {
        [
            f64::from(self.hour),
            f64::from(self.day_of_week),
            f64::from(self.is_desktop),
            f64::from(self.is_mobile),
        ]
    }
}
