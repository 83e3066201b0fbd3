use chrono::{DateTime, Duration, Utc};

use crate::entities::{EnrichedRecord, TimeSeries};
use crate::errors::AnalysisError;
use crate::utils::{floor_to_hour, format_minute};

/// Hourly visit counts from the first to the last visited hour, gaps included.
/// Refuses spans longer than `max_hours` buckets before allocating them.
pub fn hourly_buckets(
    records: &[EnrichedRecord],
    max_hours: usize,
) -> Result<Vec<(DateTime<Utc>, u64)>, AnalysisError> {
    let Some(start) = records.iter().map(|r| floor_to_hour(r.visited_at)).min() else {
        return Ok(Vec::new());
    };
    let end = records
        .iter()
        .map(|r| floor_to_hour(r.visited_at))
        .max()
        .unwrap_or(start);

    let span = (end - start).num_hours().saturating_add(1);
    let len = usize::try_from(span).unwrap_or(usize::MAX);
    if len > max_hours {
        return Err(AnalysisError::InvalidParameter(format!(
            "visits span {} hourly buckets ({} .. {}), limit is {}",
            span,
            format_minute(&start),
            format_minute(&end),
            max_hours
        )));
    }

    let mut counts = vec![0u64; len];
    for record in records {
        let slot = (floor_to_hour(record.visited_at) - start).num_hours() as usize;
        counts[slot] += 1;
    }
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| (start + Duration::hours(idx as i64), count))
        .collect())
}

/// Trailing mean over `window` buckets. Early positions average what exists so far.
pub fn rolling_mean(values: &[u64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|idx| {
            let from = (idx + 1).saturating_sub(window);
            let slice = &values[from..=idx];
            slice.iter().sum::<u64>() as f64 / slice.len() as f64
        })
        .collect()
}

pub fn resample_hourly(
    records: &[EnrichedRecord],
    window: usize,
    max_hours: usize,
) -> Result<TimeSeries, AnalysisError> {
    let buckets = hourly_buckets(records, max_hours)?;
    let values: Vec<u64> = buckets.iter().map(|(_, count)| *count).collect();
    Ok(TimeSeries {
        labels: buckets.iter().map(|(start, _)| format_minute(start)).collect(),
        rolling_avg: rolling_mean(&values, window),
        values,
    })
}
