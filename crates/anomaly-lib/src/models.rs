//! Core data models for sensor series and detection output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single multivariate observation.
///
/// `values` maps a variable name (e.g. `temperature_c`, `accel_x`) to its
/// reading at `timestamp`. A variable with no reading at this time is
/// simply not present in the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl TimePoint {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Attach a reading for `variable` at this point
    pub fn with_value(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.values.insert(variable.into(), value);
        self
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

/// Time-ordered multivariate series.
///
/// Points are kept sorted ascending by timestamp. Points sharing an exact
/// timestamp are merged, with later insertions overwriting earlier ones
/// per variable (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from points in arbitrary order
    pub fn from_points(points: Vec<TimePoint>) -> Self {
        let mut series = Self::new();
        for point in points {
            series.push(point);
        }
        series
    }

    /// Insert a point, keeping the series ordered and timestamps unique
    pub fn push(&mut self, point: TimePoint) {
        match self
            .points
            .binary_search_by_key(&point.timestamp, |p| p.timestamp)
        {
            Ok(idx) => {
                let existing = &mut self.points[idx];
                for (variable, value) in point.values {
                    existing.values.insert(variable, value);
                }
            }
            Err(idx) => self.points.insert(idx, point),
        }
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [TimePoint] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Names of all variables with at least one reading
    pub fn variables(&self) -> BTreeSet<String> {
        self.points
            .iter()
            .flat_map(|p| p.values.keys().cloned())
            .collect()
    }
}

/// One aggregated row of a resampled series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledPoint {
    pub bucket_start: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl ResampledPoint {
    pub fn new(bucket_start: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            values: BTreeMap::new(),
        }
    }

    /// Attach an aggregated reading for `variable` in this bucket
    pub fn with_value(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.values.insert(variable.into(), value);
        self
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

/// Regular series of aggregated rows, one per bucket that received at
/// least one reading.
///
/// Usually produced by [`resample`](crate::resample::resample), but also
/// constructible from rows a data source has already aggregated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResampledSeries {
    rows: Vec<ResampledPoint>,
}

impl ResampledSeries {
    /// Build from pre-aggregated rows in arbitrary order.
    ///
    /// Rows are sorted ascending; rows sharing a bucket timestamp are
    /// merged with last write wins per variable, and non-finite values
    /// are dropped as absent.
    pub fn from_rows(rows: Vec<ResampledPoint>) -> Self {
        let mut normalized: Vec<ResampledPoint> = Vec::with_capacity(rows.len());
        for row in rows {
            let idx = normalized.binary_search_by_key(&row.bucket_start, |r| r.bucket_start);
            match idx {
                Ok(i) => {
                    for (variable, value) in row.values {
                        if value.is_finite() {
                            normalized[i].values.insert(variable, value);
                        }
                    }
                }
                Err(i) => {
                    let mut clean = ResampledPoint::new(row.bucket_start);
                    clean
                        .values
                        .extend(row.values.into_iter().filter(|(_, v)| v.is_finite()));
                    normalized.insert(i, clean);
                }
            }
        }
        normalized.retain(|row| !row.values.is_empty());
        Self { rows: normalized }
    }

    pub fn rows(&self) -> &[ResampledPoint] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of all variables with at least one aggregated reading
    pub fn variables(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect()
    }
}

/// Trailing mean and spread for one variable at one resampled timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingBand {
    pub timestamp: DateTime<Utc>,
    /// Mean of the readings in the trailing window
    pub mean: f64,
    /// Sample standard deviation over the window. `None` when fewer than
    /// two readings contributed; a single sample has no defined spread.
    pub std_dev: Option<f64>,
    /// Number of readings that contributed to the window
    pub samples: usize,
}

impl RollingBand {
    /// Upper band edge at `k` standard deviations, when the spread is defined
    pub fn upper(&self, k: f64) -> Option<f64> {
        self.std_dev.map(|sd| self.mean + k * sd)
    }

    /// Lower band edge at `k` standard deviations, when the spread is defined
    pub fn lower(&self, k: f64) -> Option<f64> {
        self.std_dev.map(|sd| self.mean - k * sd)
    }
}

/// Anomaly decision for one variable at one resampled timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub timestamp: DateTime<Utc>,
    pub is_anomaly: bool,
}

/// Per-variable digest of a resampled series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub variable: String,
    /// Most recent aggregated reading
    pub latest: f64,
    pub latest_at: DateTime<Utc>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub samples: usize,
}
