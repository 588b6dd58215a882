//! Per-variable digests of a resampled series

use crate::models::{ResampledSeries, VariableSummary};
use chrono::{DateTime, Utc};

/// Summarize every variable in a resampled series: the most recent
/// reading plus min/max/mean over the covered range. Variables with no
/// readings are omitted.
pub fn summarize(resampled: &ResampledSeries) -> Vec<VariableSummary> {
    let mut summaries = Vec::new();
    for variable in resampled.variables() {
        let mut latest: Option<(DateTime<Utc>, f64)> = None;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut samples = 0usize;

        for row in resampled.rows() {
            if let Some(value) = row.value(&variable) {
                latest = Some((row.bucket_start, value));
                if value < min {
                    min = value;
                }
                if value > max {
                    max = value;
                }
                sum += value;
                samples += 1;
            }
        }

        if let Some((latest_at, latest_value)) = latest {
            summaries.push(VariableSummary {
                variable,
                latest: latest_value,
                latest_at,
                min,
                max,
                mean: sum / samples as f64,
                samples,
            });
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResampledPoint;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_summary_digest() {
        let resampled = ResampledSeries::from_rows(vec![
            ResampledPoint::new(ts(0)).with_value("temp", 20.0).with_value("hum", 50.0),
            ResampledPoint::new(ts(60)).with_value("temp", 26.0),
            ResampledPoint::new(ts(120)).with_value("temp", 23.0).with_value("hum", 56.0),
        ]);

        let summaries = summarize(&resampled);
        assert_eq!(summaries.len(), 2);

        let temp = summaries.iter().find(|s| s.variable == "temp").unwrap();
        assert_eq!(temp.latest, 23.0);
        assert_eq!(temp.latest_at, ts(120));
        assert_eq!(temp.min, 20.0);
        assert_eq!(temp.max, 26.0);
        assert!((temp.mean - 23.0).abs() < 1e-12);
        assert_eq!(temp.samples, 3);

        let hum = summaries.iter().find(|s| s.variable == "hum").unwrap();
        assert_eq!(hum.latest, 56.0);
        assert_eq!(hum.samples, 2);
        assert!((hum.mean - 53.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series_has_no_summaries() {
        assert!(summarize(&ResampledSeries::default()).is_empty());
    }
}
