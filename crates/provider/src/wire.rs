//! Wire types for the point-data provider's batched response.
//!
//! The provider answers a multi-point query with a JSON array, one object
//! per requested coordinate pair. Each object carries an hourly block with
//! the shared time axis (`start`/`end` epoch seconds, `end` exclusive,
//! `interval` step) and one value array per requested parameter. Null
//! values become NaN so gaps survive into the cube instead of turning into
//! zeros.

use grid_engine::{PointSeries, TimeAxis};
use radar_common::{RadarError, RadarResult, Variable};
use serde::Deserialize;
use std::collections::HashMap;

/// One point's slice of the batched response.
#[derive(Debug, Clone, Deserialize)]
pub struct PointResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: HourlyBlock,
}

/// Hourly block: shared axis plus per-parameter value arrays.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlyBlock {
    pub start: i64,
    pub end: i64,
    pub interval: i64,
    #[serde(flatten)]
    pub series: HashMap<String, Vec<Option<f32>>>,
}

impl PointResponse {
    /// Convert into a typed `PointSeries`, keeping only `variables`.
    pub fn into_point_series(self, variables: &[Variable]) -> RadarResult<PointSeries> {
        let axis = TimeAxis {
            start: self.hourly.start,
            end: self.hourly.end,
            interval: self.hourly.interval,
        };
        axis.validate()?;

        let mut values = HashMap::with_capacity(variables.len());
        for &variable in variables {
            let raw = self.hourly.series.get(variable.provider_name()).ok_or_else(|| {
                RadarError::provider_unavailable(format!(
                    "response for ({}, {}) lacks parameter '{}'",
                    self.latitude,
                    self.longitude,
                    variable.provider_name()
                ))
            })?;
            if raw.len() != axis.len() {
                return Err(RadarError::inconsistent_time_axis(format!(
                    "parameter '{}' has {} values for a {}-step axis",
                    variable.provider_name(),
                    raw.len(),
                    axis.len()
                )));
            }
            values.insert(
                variable,
                raw.iter().map(|v| v.unwrap_or(f32::NAN)).collect(),
            );
        }

        Ok(PointSeries {
            lat: self.latitude,
            lon: self.longitude,
            axis,
            values,
        })
    }
}

/// Parse the full batched payload.
pub fn parse_batch(body: &[u8]) -> RadarResult<Vec<PointResponse>> {
    serde_json::from_slice(body)
        .map_err(|e| RadarError::provider_unavailable(format!("malformed payload: {}", e)))
}
