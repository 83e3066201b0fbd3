use std::collections::{BTreeMap, HashMap, HashSet};

use crate::entities::{
    BreakdownEntry, CountryDistribution, DeviceByCountry, EnrichedRecord, MapPoint,
    TrafficSummary,
};
use crate::value_objects::{Browser, Platform};

/// Visit counts per country, most visited first.
///
/// Countries are counted in first-encountered order and then stably sorted,
/// so equal counts keep the order in which the countries first appeared.
pub fn country_counts(records: &[EnrichedRecord]) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for record in records {
        let country = record.geo.country.as_str();
        match index.get(country) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(country, counts.len());
                counts.push((country.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn top_countries(records: &[EnrichedRecord], limit: usize) -> Vec<(String, u64)> {
    let mut counts = country_counts(records);
    counts.truncate(limit);
    counts
}

pub fn country_distribution(records: &[EnrichedRecord], limit: usize) -> CountryDistribution {
    let (labels, values) = top_countries(records, limit).into_iter().unzip();
    CountryDistribution { labels, values }
}

pub fn device_by_country(records: &[EnrichedRecord], limit: usize) -> DeviceByCountry {
    let mut devices: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in records {
        let entry = devices.entry(record.geo.country.as_str()).or_default();
        entry.0 += u64::from(record.is_desktop);
        entry.1 += u64::from(record.is_mobile);
    }

    let mut out = DeviceByCountry::default();
    for (country, _) in top_countries(records, limit) {
        let (desktop, mobile) = devices.get(country.as_str()).copied().unwrap_or_default();
        out.labels.push(country);
        out.desktop.push(desktop);
        out.mobile.push(mobile);
    }
    out
}

/// One point per located country, carrying the coordinates of the country's
/// first record. Countries whose first record is unresolved `(0,0)` are left
/// off the map. Points come out ordered by country name.
pub fn visitor_map(records: &[EnrichedRecord]) -> Vec<MapPoint> {
    let mut groups: BTreeMap<&str, MapPoint> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.geo.country.as_str())
            .and_modify(|point| point.count += 1)
            .or_insert_with(|| MapPoint {
                country: record.geo.country.clone(),
                count: 1,
                lat: record.geo.latitude,
                lng: record.geo.longitude,
            });
    }
    groups
        .into_values()
        .filter(|point| !(point.lat == 0.0 && point.lng == 0.0))
        .collect()
}

pub fn traffic_summary(records: &[EnrichedRecord]) -> TrafficSummary {
    let total = records.len() as u64;
    let distinct_ips = records
        .iter()
        .map(|record| record.ip_address.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    TrafficSummary {
        total_visits: total,
        distinct_ips,
        devices: breakdown(records.iter().map(|r| r.device_type.as_str()), total),
        browsers: breakdown(
            records.iter().map(|r| Browser::classify(&r.user_agent).as_str()),
            total,
        ),
        platforms: breakdown(
            records.iter().map(|r| Platform::classify(&r.user_agent).as_str()),
            total,
        ),
    }
}

fn breakdown<'a>(labels: impl Iterator<Item = &'a str>, total: u64) -> Vec<BreakdownEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(label, count)| BreakdownEntry {
            label: label.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 10_000.0 / total as f64).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GeoInfo;
    use crate::utils::parse_visit_timestamp;

    fn enriched(ip: &str, country: &str, loc: &str, device: &str) -> EnrichedRecord {
        let (is_desktop, is_mobile) = match device {
            "Desktop" => (1, 0),
            "Mobile" => (0, 1),
            _ => (0, 0),
        };
        EnrichedRecord {
            id: 0,
            ip_address: ip.to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0) Chrome/120.0".to_string(),
            device_type: device.to_string(),
            visited_at: parse_visit_timestamp("2024-01-01T10:00:00Z").expect("fixture"),
            geo: GeoInfo::from_parts(ip, Some(country.to_string()), None, None, Some(loc)),
            hour: 10,
            day_of_week: 0,
            is_desktop,
            is_mobile,
        }
    }

    #[test]
    fn single_country_example() {
        let records = vec![
            enriched("1.1.1.1", "US", "10,20", "Desktop"),
            enriched("1.1.1.1", "US", "10,20", "Mobile"),
        ];
        assert_eq!(
            country_distribution(&records, 10),
            CountryDistribution {
                labels: vec!["US".to_string()],
                values: vec![2],
            }
        );
        assert_eq!(
            device_by_country(&records, 10),
            DeviceByCountry {
                labels: vec!["US".to_string()],
                desktop: vec![1],
                mobile: vec![1],
            }
        );
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let records = vec![
            enriched("1", "FR", "1,1", "Desktop"),
            enriched("2", "DE", "1,1", "Desktop"),
            enriched("3", "US", "1,1", "Desktop"),
            enriched("4", "US", "1,1", "Desktop"),
            enriched("5", "DE", "1,1", "Desktop"),
            enriched("6", "FR", "1,1", "Desktop"),
            enriched("7", "JP", "1,1", "Desktop"),
        ];
        let dist = country_distribution(&records, 10);
        assert_eq!(dist.labels, vec!["FR", "DE", "US", "JP"]);
        assert_eq!(dist.values, vec![2, 2, 2, 1]);
    }

    #[test]
    fn top_list_is_capped_and_non_increasing() {
        let mut records = Vec::new();
        for (i, country) in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"]
            .iter()
            .enumerate()
        {
            for _ in 0..=i {
                records.push(enriched("ip", country, "1,1", "Desktop"));
            }
        }
        let dist = country_distribution(&records, 10);
        assert_eq!(dist.labels.len(), 10);
        assert_eq!(dist.labels[0], "L");
        assert!(dist.values.windows(2).all(|pair| pair[0] >= pair[1]));

        let devices = device_by_country(&records, 10);
        assert_eq!(devices.labels, dist.labels);
        assert_eq!(devices.desktop, dist.values);
        assert!(devices.mobile.iter().all(|count| *count == 0));
    }

    #[test]
    fn map_uses_first_location_and_skips_unresolved() {
        let records = vec![
            enriched("1", "US", "10,20", "Desktop"),
            enriched("2", "US", "30,40", "Mobile"),
            enriched("3", "Unknown", "0,0", "Desktop"),
            enriched("4", "DE", "0,5", "Desktop"),
        ];
        let map = visitor_map(&records);
        assert_eq!(
            map,
            vec![
                MapPoint {
                    country: "DE".to_string(),
                    count: 1,
                    lat: 0.0,
                    lng: 5.0,
                },
                MapPoint {
                    country: "US".to_string(),
                    count: 2,
                    lat: 10.0,
                    lng: 20.0,
                },
            ]
        );
    }

    #[test]
    fn traffic_summary_breaks_down_devices_and_agents() {
        let records = vec![
            enriched("1.1.1.1", "US", "1,1", "Desktop"),
            enriched("1.1.1.1", "US", "1,1", "Desktop"),
            enriched("2.2.2.2", "US", "1,1", "Mobile"),
        ];
        let summary = traffic_summary(&records);
        assert_eq!(summary.total_visits, 3);
        assert_eq!(summary.distinct_ips, 2);
        assert_eq!(summary.devices[0].label, "Desktop");
        assert_eq!(summary.devices[0].count, 2);
        assert_eq!(summary.devices[0].percentage, 66.67);
        assert_eq!(summary.devices[1].percentage, 33.33);
        assert_eq!(summary.browsers.len(), 1);
        assert_eq!(summary.browsers[0].label, "Chrome");
        assert_eq!(summary.platforms[0].label, "Windows");
        assert_eq!(summary.platforms[0].percentage, 100.0);
    }

    #[test]
    fn empty_table_yields_empty_reports() {
        assert_eq!(country_distribution(&[], 10), CountryDistribution::default());
        assert_eq!(device_by_country(&[], 10), DeviceByCountry::default());
        assert!(visitor_map(&[]).is_empty());
        assert_eq!(traffic_summary(&[]).total_visits, 0);
    }
}
