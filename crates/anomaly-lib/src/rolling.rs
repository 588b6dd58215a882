//! Trailing rolling statistics over a resampled series

use crate::error::Result;
use crate::models::{ResampledSeries, RollingBand};
use crate::resample::duration_millis;
use std::collections::VecDeque;
use std::time::Duration;

/// Sliding window of timestamped samples with trailing statistics.
///
/// The window at evaluation time `t` covers `(t - window, t]`: a sample
/// exactly `window` old has fallen out. Timestamps must be fed in
/// non-decreasing order.
#[derive(Debug)]
pub(crate) struct RollingWindow {
    samples: VecDeque<(i64, f64)>,
    window_ms: i64,
}

impl RollingWindow {
    pub(crate) fn new(window_ms: i64) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms,
        }
    }

    /// Add a sample and expire anything that fell out of the window
    pub(crate) fn push(&mut self, timestamp_ms: i64, value: f64) {
        self.expire(timestamp_ms);
        self.samples.push_back((timestamp_ms, value));
    }

    /// Advance the window to `timestamp_ms` without adding a sample
    pub(crate) fn advance(&mut self, timestamp_ms: i64) {
        self.expire(timestamp_ms);
    }

    fn expire(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.window_ms;
        while let Some((ts, _)) = self.samples.front() {
            if *ts <= cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// Mean and sample standard deviation of the current window.
    ///
    /// Recomputed two-pass for numerical stability. With `skip_last` the
    /// most recently pushed sample is left out. Returns `None` on an
    /// empty window; the deviation is `None` when only one sample
    /// contributes (Bessel's correction needs two).
    pub(crate) fn stats(&self, skip_last: bool) -> Option<(f64, Option<f64>)> {
        let count = if skip_last {
            self.samples.len().saturating_sub(1)
        } else {
            self.samples.len()
        };
        if count == 0 {
            return None;
        }

        let sum: f64 = self.samples.iter().take(count).map(|(_, v)| v).sum();
        let mean = sum / count as f64;

        let std_dev = if count > 1 {
            let variance = self
                .samples
                .iter()
                .take(count)
                .map(|(_, v)| (v - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };

        Some((mean, std_dev))
    }
}

/// Compute the trailing mean/deviation band for `variable` at every
/// resampled timestamp with at least one in-window reading.
///
/// The window at `t` is `(t - window, t]`, causal and inclusive of `t`.
/// A row where the variable is absent still receives a band as long as
/// an earlier in-window reading exists; a variable present in no row
/// yields an empty vector.
pub fn rolling_stats(
    resampled: &ResampledSeries,
    variable: &str,
    window: Duration,
) -> Result<Vec<RollingBand>> {
    let window_ms = duration_millis(window, "window")?;
    Ok(rolling_stats_ms(resampled, variable, window_ms))
}

pub(crate) fn rolling_stats_ms(
    resampled: &ResampledSeries,
    variable: &str,
    window_ms: i64,
) -> Vec<RollingBand> {
    let mut rolling = RollingWindow::new(window_ms);
    let mut bands = Vec::new();
    for row in resampled.rows() {
        let ts_ms = row.bucket_start.timestamp_millis();
        match row.value(variable) {
            Some(value) => rolling.push(ts_ms, value),
            None => rolling.advance(ts_ms),
        }
        if let Some((mean, std_dev)) = rolling.stats(false) {
            bands.push(RollingBand {
                timestamp: row.bucket_start,
                mean,
                std_dev,
                samples: rolling.len(),
            });
        }
    }
    bands
}
