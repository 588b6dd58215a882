//! Derived channels computed from raw sensor variables
//!
//! Combined readouts charted alongside raw channels: a Euclidean vector
//! magnitude across axis variables and the NWS heat index from
//! temperature and relative humidity. Both are per-point transformations
//! applied before resampling; the output is absent wherever any input
//! reading is absent.

use crate::models::Series;

impl Series {
    /// Add `output` to every point where all `axes` readings are
    /// present: the Euclidean magnitude across those axes.
    pub fn derive_magnitude(&mut self, axes: &[&str], output: &str) {
        if axes.is_empty() {
            return;
        }
        for point in self.points_mut() {
            let mut sum_sq = 0.0;
            let mut complete = true;
            for axis in axes {
                match point.value(axis) {
                    Some(v) => sum_sq += v * v,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                point.values.insert(output.to_string(), sum_sq.sqrt());
            }
        }
    }

    /// Add `output` to every point where both the `temperature` (°C) and
    /// `humidity` (% relative) readings are present: the heat index in °C.
    pub fn derive_heat_index(&mut self, temperature: &str, humidity: &str, output: &str) {
        for point in self.points_mut() {
            if let (Some(t), Some(rh)) = (point.value(temperature), point.value(humidity)) {
                point
                    .values
                    .insert(output.to_string(), heat_index_celsius(t, rh));
            }
        }
    }
}

/// NWS heat index in °C from temperature (°C) and relative humidity (%).
///
/// Uses Steadman's simple formula below the regression's range and the
/// Rothfusz regression with the standard low-humidity and high-humidity
/// adjustments above it.
pub fn heat_index_celsius(temperature_c: f64, relative_humidity: f64) -> f64 {
    let t = temperature_c * 9.0 / 5.0 + 32.0;
    let rh = relative_humidity;

    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    let hi = if (simple + t) / 2.0 < 80.0 {
        simple
    } else {
        let mut hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 0.00683783 * t * t
            - 0.05481717 * rh * rh
            + 0.00122874 * t * t * rh
            + 0.00085282 * t * rh * rh
            - 0.00000199 * t * t * rh * rh;
        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= (13.0 - rh) / 4.0 * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
        } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += (rh - 85.0) / 10.0 * ((87.0 - t) / 5.0);
        }
        hi
    };

    (hi - 32.0) * 5.0 / 9.0
}
