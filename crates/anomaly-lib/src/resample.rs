//! Aggregation of irregular samples into fixed-width buckets

use crate::error::{DetectorError, Result};
use crate::models::{ResampledPoint, ResampledSeries, Series};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Aggregate a series into fixed-width, epoch-aligned buckets.
///
/// Buckets are half-open intervals `[start, start + bucket_width)`. Each
/// variable's readings within a bucket are averaged; a variable with no
/// reading in a bucket stays absent from that row, and buckets that
/// received no reading at all produce no row. Non-finite readings count
/// as absent.
pub fn resample(series: &Series, bucket_width: Duration) -> Result<ResampledSeries> {
    let width_ms = duration_millis(bucket_width, "bucket_width")?;

    // bucket start -> variable -> (sum, count)
    let mut buckets: BTreeMap<DateTime<Utc>, BTreeMap<&str, (f64, usize)>> = BTreeMap::new();
    for point in series.points() {
        let offset_ms = point.timestamp.timestamp_millis().rem_euclid(width_ms);
        let Some(bucket_start) = point
            .timestamp
            .checked_sub_signed(chrono::Duration::milliseconds(offset_ms))
        else {
            continue;
        };
        for (variable, value) in &point.values {
            if !value.is_finite() {
                continue;
            }
            let (sum, count) = buckets
                .entry(bucket_start)
                .or_default()
                .entry(variable.as_str())
                .or_insert((0.0, 0));
            *sum += value;
            *count += 1;
        }
    }

    let rows: Vec<ResampledPoint> = buckets
        .into_iter()
        .map(|(bucket_start, vars)| ResampledPoint {
            bucket_start,
            values: vars
                .into_iter()
                .map(|(variable, (sum, count))| (variable.to_string(), sum / count as f64))
                .collect(),
        })
        .collect();

    debug!(
        source_points = series.len(),
        rows = rows.len(),
        bucket_width_ms = width_ms,
        "resampled series"
    );

    Ok(ResampledSeries::from_rows(rows))
}

/// Validate a duration parameter and convert it to whole milliseconds
pub(crate) fn duration_millis(duration: Duration, parameter: &'static str) -> Result<i64> {
    if duration.is_zero() {
        return Err(DetectorError::invalid(parameter, "must be positive"));
    }
    let millis = duration.as_millis();
    if millis == 0 {
        return Err(DetectorError::invalid(
            parameter,
            "must be at least one millisecond",
        ));
    }
    i64::try_from(millis).map_err(|_| DetectorError::invalid(parameter, "exceeds supported range"))
}
