//! Rolling-window anomaly detection for multivariate sensor series
//!
//! This crate turns an irregular, time-ordered table of sensor readings
//! (temperature, humidity, accelerometer and gyroscope axes) into regular
//! buckets, computes trailing mean/standard-deviation bands per variable,
//! and flags readings that fall outside the band:
//! - Resampling of irregular observations into fixed-width buckets
//! - Trailing rolling statistics over a causal window
//! - Per-variable sigma-threshold anomaly flags
//! - Derived channels (vector magnitude, heat index) and per-variable digests
//!
//! The crate performs no I/O: fetching readings and rendering results
//! belong to the surrounding application.

pub mod config;
pub mod derive;
pub mod detector;
pub mod error;
pub mod models;
pub mod resample;
pub mod rolling;
pub mod summary;

pub use config::DetectorSettings;
pub use detector::{BandPolicy, RollingAnomalyDetector};
pub use error::{DetectorError, Result};
pub use models::*;
pub use resample::resample;
pub use rolling::rolling_stats;
pub use summary::summarize;
