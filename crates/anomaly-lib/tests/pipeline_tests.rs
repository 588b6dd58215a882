//! End-to-end pipeline tests: irregular multi-sensor input through
//! resampling, derived channels, rolling bands, and anomaly flags.

use anomaly_lib::{
    resample, rolling_stats, summarize, BandPolicy, DetectorError, RollingAnomalyDetector, Series,
    TimePoint,
};
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);
const HALF_HOUR: Duration = Duration::from_secs(1800);

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Two IMU sensors reporting at irregular sub-minute intervals, with a
/// vibration burst on one of them near the end.
fn imu_series() -> Series {
    let mut series = Series::new();
    for minute in 0..25i64 {
        // a few readings per minute, slightly jittered
        for (offset, jitter) in [(7, 0.00), (29, 0.01), (51, -0.01)] {
            let t = ts(minute * 60 + offset);
            let burst = if minute >= 22 { 3.0 } else { 0.0 };
            series.push(
                TimePoint::new(t)
                    .with_value("accel_x", 0.02 + jitter + burst)
                    .with_value("accel_y", 0.05 - jitter)
                    .with_value("accel_z", 0.98 + jitter),
            );
            series.push(
                TimePoint::new(ts(minute * 60 + offset + 2))
                    .with_value("temperature_c", 24.0 + (minute % 3) as f64 * 0.2)
                    .with_value("humidity", 55.0 + (minute % 4) as f64 * 0.5),
            );
        }
    }
    series
}

#[test]
fn test_full_pipeline_flags_vibration_burst() {
    let mut series = imu_series();
    series.derive_magnitude(&["accel_x", "accel_y", "accel_z"], "accel_mag");
    series.derive_heat_index("temperature_c", "humidity", "heat_index");

    let resampled = resample(&series, MINUTE).unwrap();
    assert_eq!(resampled.len(), 25);

    let detector = RollingAnomalyDetector::new(HALF_HOUR, 2.5).unwrap();
    let by_variable = detector.detect_all(&resampled);

    // The burst minutes stand out on the combined magnitude channel
    let mag_flags = &by_variable["accel_mag"];
    let flagged: Vec<DateTime<Utc>> = mag_flags
        .iter()
        .filter(|f| f.is_anomaly)
        .map(|f| f.timestamp)
        .collect();
    assert!(flagged.contains(&ts(22 * 60)));

    // Environmental channels stay quiet
    assert!(by_variable["temperature_c"].iter().all(|f| !f.is_anomaly));
    assert!(by_variable["humidity"].iter().all(|f| !f.is_anomaly));
    assert!(by_variable["heat_index"].iter().all(|f| !f.is_anomaly));
}

#[test]
fn test_bands_cover_quiet_readings() {
    let mut series = imu_series();
    series.derive_magnitude(&["accel_x", "accel_y", "accel_z"], "accel_mag");
    let resampled = resample(&series, MINUTE).unwrap();

    let bands = rolling_stats(&resampled, "temperature_c", HALF_HOUR).unwrap();
    assert_eq!(bands.len(), resampled.len());
    for (band, row) in bands.iter().zip(resampled.rows()) {
        assert_eq!(band.timestamp, row.bucket_start);
        let value = row.value("temperature_c").unwrap();
        if let (Some(upper), Some(lower)) = (band.upper(2.5), band.lower(2.5)) {
            assert!(value <= upper && value >= lower);
        }
    }
}

#[test]
fn test_sparse_variable_degrades_to_empty_output() {
    // One variable entirely absent for ten consecutive buckets
    let mut series = Series::new();
    for minute in 0..10i64 {
        series.push(TimePoint::new(ts(minute * 60 + 5)).with_value("humidity", 50.0));
    }
    let resampled = resample(&series, MINUTE).unwrap();
    assert_eq!(resampled.len(), 10);

    let bands = rolling_stats(&resampled, "temperature_c", HALF_HOUR).unwrap();
    assert!(bands.is_empty());

    let detector = RollingAnomalyDetector::new(HALF_HOUR, 2.5).unwrap();
    assert!(detector.detect(&resampled, "temperature_c").is_empty());
}

#[test]
fn test_invalid_window_is_a_configuration_error() {
    let err = RollingAnomalyDetector::new(Duration::ZERO, 2.5).unwrap_err();
    assert!(matches!(
        err,
        DetectorError::InvalidConfiguration { parameter: "window", .. }
    ));

    let resampled = resample(&imu_series(), MINUTE).unwrap();
    assert!(rolling_stats(&resampled, "humidity", Duration::ZERO).is_err());
}

#[test]
fn test_pipeline_is_idempotent_to_the_byte() {
    let run = || {
        let mut series = imu_series();
        series.derive_magnitude(&["accel_x", "accel_y", "accel_z"], "accel_mag");
        let resampled = resample(&series, MINUTE).unwrap();
        let detector = RollingAnomalyDetector::new(HALF_HOUR, 2.5)
            .unwrap()
            .with_policy(BandPolicy::LeaveOneOut);

        let bands = detector.rolling_stats(&resampled, "accel_mag");
        let flags = detector.detect_all(&resampled);
        let summaries = summarize(&resampled);
        (
            serde_json::to_string(&resampled).unwrap(),
            serde_json::to_string(&bands).unwrap(),
            serde_json::to_string(&flags).unwrap(),
            serde_json::to_string(&summaries).unwrap(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_summaries_reflect_latest_readings() {
    let series = imu_series();
    let resampled = resample(&series, MINUTE).unwrap();
    let summaries = summarize(&resampled);

    let temp = summaries.iter().find(|s| s.variable == "temperature_c").unwrap();
    assert_eq!(temp.latest_at, ts(24 * 60));
    assert_eq!(temp.samples, 25);
    assert!(temp.min >= 24.0 && temp.max <= 24.4);
}
