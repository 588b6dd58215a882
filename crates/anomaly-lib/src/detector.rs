//! Rolling z-score anomaly detection
//!
//! Joins each resampled value with the trailing mean/standard-deviation
//! band at its timestamp and flags values falling strictly outside
//! `mean ± k·std_dev`. Each variable is scored independently.

use crate::error::{DetectorError, Result};
use crate::models::{AnomalyFlag, ResampledSeries, RollingBand};
use crate::resample::duration_millis;
use crate::rolling::{rolling_stats_ms, RollingWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Default sigma multiplier
const DEFAULT_SIGMA_THRESHOLD: f64 = 2.5;

/// Default trailing window (30 minutes of 1-minute buckets)
const DEFAULT_WINDOW_SECS: u64 = 30 * 60;

/// How the band at an evaluated timestamp treats that timestamp's own value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPolicy {
    /// The evaluated value contributes to its own band. Matches the
    /// common trailing-rolling-window idiom; a genuine spike widens the
    /// band it is tested against, damping its own z-score.
    #[default]
    Inclusive,
    /// The evaluated value is left out of its own band, sharpening the
    /// z-score of isolated spikes.
    LeaveOneOut,
}

/// Flags out-of-band values in a resampled series.
///
/// Holds the trailing window, the sigma multiplier, and the band policy;
/// the detection itself is a pure function of the input series and this
/// configuration, with no state carried between calls.
#[derive(Debug, Clone)]
pub struct RollingAnomalyDetector {
    window_ms: i64,
    sigma_threshold: f64,
    policy: BandPolicy,
}

impl RollingAnomalyDetector {
    /// Create a detector.
    ///
    /// Fails with [`DetectorError::InvalidConfiguration`] when the window
    /// is zero or the sigma multiplier is not a positive finite number.
    pub fn new(window: Duration, sigma_threshold: f64) -> Result<Self> {
        let window_ms = duration_millis(window, "window")?;
        if !sigma_threshold.is_finite() || sigma_threshold <= 0.0 {
            return Err(DetectorError::invalid(
                "sigma_threshold",
                "must be positive",
            ));
        }
        Ok(Self {
            window_ms,
            sigma_threshold,
            policy: BandPolicy::default(),
        })
    }

    /// Set the band policy
    pub fn with_policy(mut self, policy: BandPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms as u64)
    }

    pub fn sigma_threshold(&self) -> f64 {
        self.sigma_threshold
    }

    pub fn policy(&self) -> BandPolicy {
        self.policy
    }

    /// Trailing band for `variable` at every timestamp with at least one
    /// in-window reading
    pub fn rolling_stats(&self, resampled: &ResampledSeries, variable: &str) -> Vec<RollingBand> {
        rolling_stats_ms(resampled, variable, self.window_ms)
    }

    /// Evaluate `variable` against its rolling band.
    ///
    /// Emits one flag per timestamp whose band has a defined deviation
    /// (two or more in-window readings); earlier timestamps are omitted
    /// rather than flagged false. A flag is true only when the value is
    /// present, the deviation is positive, and the value sits strictly
    /// outside `mean ± sigma_threshold · std_dev`.
    pub fn detect(&self, resampled: &ResampledSeries, variable: &str) -> Vec<AnomalyFlag> {
        let mut rolling = RollingWindow::new(self.window_ms);
        let mut flags = Vec::new();
        let mut anomalies = 0usize;

        for row in resampled.rows() {
            let ts_ms = row.bucket_start.timestamp_millis();
            let value = row.value(variable);
            match value {
                Some(v) => rolling.push(ts_ms, v),
                None => rolling.advance(ts_ms),
            }

            let skip_last = self.policy == BandPolicy::LeaveOneOut && value.is_some();
            let Some((mean, Some(std_dev))) = rolling.stats(skip_last) else {
                continue;
            };

            let is_anomaly = match value {
                Some(v) => {
                    std_dev > f64::EPSILON && (v - mean).abs() > self.sigma_threshold * std_dev
                }
                None => false,
            };
            if is_anomaly {
                anomalies += 1;
            }
            flags.push(AnomalyFlag {
                timestamp: row.bucket_start,
                is_anomaly,
            });
        }

        debug!(
            variable,
            evaluated = flags.len(),
            anomalies,
            "anomaly scan complete"
        );
        flags
    }

    /// Run [`detect`](Self::detect) independently for every variable in
    /// the series
    pub fn detect_all(&self, resampled: &ResampledSeries) -> BTreeMap<String, Vec<AnomalyFlag>> {
        resampled
            .variables()
            .into_iter()
            .map(|variable| {
                let flags = self.detect(resampled, &variable);
                (variable, flags)
            })
            .collect()
    }
}

impl Default for RollingAnomalyDetector {
    fn default() -> Self {
        Self {
            window_ms: (DEFAULT_WINDOW_SECS * 1000) as i64,
            sigma_threshold: DEFAULT_SIGMA_THRESHOLD,
            policy: BandPolicy::default(),
        }
    }
}
