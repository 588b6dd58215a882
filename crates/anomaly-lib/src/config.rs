//! Detection pipeline configuration

use crate::detector::{BandPolicy, RollingAnomalyDetector};
use crate::error::{DetectorError, Result as DetectorResult};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Detection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorSettings {
    /// Width of the resampling buckets in seconds
    #[serde(default = "default_bucket_width_secs")]
    pub bucket_width_secs: u64,

    /// Trailing window for rolling statistics in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Standard deviations beyond which a reading is anomalous
    #[serde(default = "default_sigma_threshold")]
    pub sigma_threshold: f64,

    /// Whether the evaluated reading contributes to its own band
    #[serde(default)]
    pub band_policy: BandPolicy,
}

fn default_bucket_width_secs() -> u64 {
    60
}

fn default_window_secs() -> u64 {
    1800
}

fn default_sigma_threshold() -> f64 {
    2.5
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            bucket_width_secs: default_bucket_width_secs(),
            window_secs: default_window_secs(),
            sigma_threshold: default_sigma_threshold(),
            band_policy: BandPolicy::default(),
        }
    }
}

impl DetectorSettings {
    /// Load settings from `DETECTOR_`-prefixed environment variables.
    ///
    /// Unset fields fall back to their defaults; malformed values are an
    /// error, never silently replaced.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("DETECTOR"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bucket_width(&self) -> Duration {
        Duration::from_secs(self.bucket_width_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Build a detector from these settings, validating them
    pub fn detector(&self) -> DetectorResult<RollingAnomalyDetector> {
        if self.bucket_width_secs == 0 {
            return Err(DetectorError::invalid("bucket_width", "must be positive"));
        }
        Ok(RollingAnomalyDetector::new(self.window(), self.sigma_threshold)?
            .with_policy(self.band_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_build_a_detector() {
        let settings = DetectorSettings::default();
        assert_eq!(settings.bucket_width(), Duration::from_secs(60));
        assert_eq!(settings.window(), Duration::from_secs(1800));

        let detector = settings.detector().unwrap();
        assert_eq!(detector.sigma_threshold(), 2.5);
        assert_eq!(detector.policy(), BandPolicy::Inclusive);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = DetectorSettings {
            window_secs: 0,
            ..DetectorSettings::default()
        };
        assert!(settings.detector().is_err());

        let settings = DetectorSettings {
            sigma_threshold: -1.0,
            ..DetectorSettings::default()
        };
        assert!(settings.detector().is_err());

        let settings = DetectorSettings {
            bucket_width_secs: 0,
            ..DetectorSettings::default()
        };
        assert!(matches!(
            settings.detector().unwrap_err(),
            DetectorError::InvalidConfiguration { parameter: "bucket_width", .. }
        ));
    }

    #[test]
    fn test_band_policy_from_string() {
        let settings: DetectorSettings =
            serde_json::from_str(r#"{"band_policy": "leave_one_out"}"#).unwrap();
        assert_eq!(settings.band_policy, BandPolicy::LeaveOneOut);
        assert_eq!(settings.sigma_threshold, 2.5);
    }
}
