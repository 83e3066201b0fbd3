// Output artifact schemas
// Each struct serializes to exactly the JSON the dashboard reads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const COUNTRY_DISTRIBUTION: &str = "country_distribution";
pub const DEVICE_BY_COUNTRY: &str = "device_by_country";
pub const VISITOR_MAP: &str = "visitor_map";
pub const TRAFFIC_SUMMARY: &str = "traffic_summary";
pub const CLUSTERS: &str = "clusters";
pub const TIME_SERIES: &str = "time_series";
pub const ANOMALIES: &str = "anomalies";
pub const RUN_MANIFEST: &str = "run_manifest";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryDistribution {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceByCountry {
    pub labels: Vec<String>,
    pub desktop: Vec<u64>,
    pub mobile: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub country: String,
    pub count: u64,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub total_visits: u64,
    pub distinct_ips: u64,
    pub devices: Vec<BreakdownEntry>,
    pub browsers: Vec<BreakdownEntry>,
    pub platforms: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub clusters: BTreeMap<usize, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub rolling_avg: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub timestamps: Vec<String>,
    pub count: u64,
}
