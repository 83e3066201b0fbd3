use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a stored visit timestamp into a UTC instant.
///
/// Accepts RFC 3339, space-separated timestamps with or without an offset
/// (`Z` is read as UTC), and Go's `time.Time` string form which appends a
/// zone abbreviation after the numeric offset. Naive values are taken as UTC.
pub fn parse_visit_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let value = strip_zone_abbreviation(value);
    if let Some(naive) = value.strip_suffix('Z').or_else(|| value.strip_suffix(" UTC")) {
        return parse_naive(naive.trim_end());
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    parse_naive(value)
}

fn parse_naive(value: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// "2024-01-01 10:00:00 +0000 UTC" -> "2024-01-01 10:00:00 +0000"
fn strip_zone_abbreviation(value: &str) -> &str {
    let Some((head, tail)) = value.rsplit_once(' ') else {
        return value;
    };
    let is_abbreviation = !tail.is_empty() && tail.chars().all(|ch| ch.is_ascii_uppercase());
    let head_has_offset = head
        .rsplit_once(' ')
        .map(|(_, offset)| offset.starts_with('+') || offset.starts_with('-'))
        .unwrap_or(false);
    if is_abbreviation && head_has_offset {
        head
    } else {
        value
    }
}

pub fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_minute(0)
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

pub fn format_minute(instant: &DateTime<Utc>) -> String {
    instant.format(MINUTE_FORMAT).to_string()
}

pub fn format_second(instant: &DateTime<Utc>) -> String {
    instant.format(SECOND_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("fixture")
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_rfc3339_and_normalizes_offsets() {
        assert_eq!(
            parse_visit_timestamp("2024-01-01T10:00:00Z"),
            Some(utc("2024-01-01T10:00:00Z"))
        );
        assert_eq!(
            parse_visit_timestamp("2024-01-01T12:00:00+02:00"),
            Some(utc("2024-01-01T10:00:00Z"))
        );
    }

    #[test]
    fn parses_basic_offsets_after_t_separator() {
        assert_eq!(
            parse_visit_timestamp("2024-01-01T10:00:00+0000"),
            Some(utc("2024-01-01T10:00:00Z"))
        );
        assert_eq!(
            parse_visit_timestamp("2024-01-01T15:30:00.250+0530"),
            Some(utc("2024-01-01T10:00:00.250Z"))
        );
    }

    #[test]
    fn parses_go_time_strings() {
        assert_eq!(
            parse_visit_timestamp("2024-03-05 14:07:09.123456789-05:00"),
            Some(utc("2024-03-05T19:07:09.123456789Z"))
        );
        assert_eq!(
            parse_visit_timestamp("2024-03-05 14:07:09.5 +0000 UTC"),
            Some(utc("2024-03-05T14:07:09.5Z"))
        );
        assert_eq!(
            parse_visit_timestamp("2024-03-05 14:07:09 -0700 MST"),
            Some(utc("2024-03-05T21:07:09Z"))
        );
    }

    #[test]
    fn naive_timestamps_are_utc() {
        assert_eq!(
            parse_visit_timestamp("2024-03-05 14:07:09"),
            Some(utc("2024-03-05T14:07:09Z"))
        );
        assert_eq!(
            parse_visit_timestamp("2024-03-05 14:07:09Z"),
            Some(utc("2024-03-05T14:07:09Z"))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_visit_timestamp(""), None);
        assert_eq!(parse_visit_timestamp("yesterday"), None);
        assert_eq!(parse_visit_timestamp("2024-13-45 99:00:00"), None);
    }

    #[test]
    fn floors_and_formats() {
        let instant = utc("2024-01-01T10:59:59.9Z");
        assert_eq!(format_minute(&floor_to_hour(instant)), "2024-01-01 10:00");
        assert_eq!(format_second(&instant), "2024-01-01 10:59:59");
    }
}
