// Geolocation entity
// Resolved location of one IP address, plus the per-run lookup table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const UNKNOWN_LOC: &str = "0,0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoInfo {
    /// Substitute used whenever a lookup fails.
    pub fn sentinel(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            country: UNKNOWN_LABEL.to_string(),
            region: UNKNOWN_LABEL.to_string(),
            city: UNKNOWN_LABEL.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// Builds a record from optional provider fields, applying the documented defaults.
    pub fn from_parts(
        ip: &str,
        country: Option<String>,
        region: Option<String>,
        city: Option<String>,
        loc: Option<&str>,
    ) -> Self {
        let (latitude, longitude) = parse_loc(loc.unwrap_or(UNKNOWN_LOC));
        Self {
            ip: ip.to_string(),
            country: or_unknown(country),
            region: or_unknown(region),
            city: or_unknown(city),
            latitude,
            longitude,
        }
    }

    pub fn has_location(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0)
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Parses a `"lat,lng"` pair. Anything unparsable collapses to `(0.0, 0.0)`.
pub fn parse_loc(loc: &str) -> (f64, f64) {
    let mut parts = loc.split(',');
    let lat = parts.next().map(str::trim).and_then(|v| v.parse::<f64>().ok());
    let lng = parts.next().map(str::trim).and_then(|v| v.parse::<f64>().ok());
    match (lat, lng, parts.next()) {
        (Some(lat), Some(lng), None) if lat.is_finite() && lng.is_finite() => (lat, lng),
        _ => (0.0, 0.0),
    }
}

/// IP -> GeoInfo mapping built fresh for every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTable {
    entries: HashMap<String, GeoInfo>,
}

impl GeoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: GeoInfo) {
        self.entries.insert(info.ip.clone(), info);
    }

    pub fn get(&self, ip: &str) -> Option<&GeoInfo> {
        self.entries.get(ip)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<GeoInfo> for GeoTable {
    fn from_iter<T: IntoIterator<Item = GeoInfo>>(iter: T) -> Self {
        let mut table = GeoTable::new();
        for info in iter {
            table.insert(info);
        }
        table
    }
}
