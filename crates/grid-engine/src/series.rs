//! Per-point time series as returned by the point-data provider.

use chrono::{DateTime, TimeZone, Utc};
use radar_common::{RadarError, RadarResult, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared hourly time axis for one batched fetch.
///
/// `start`/`end` are epoch seconds, `end` exclusive; `interval` is the step
/// in seconds. Every point in a batch must carry the identical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub start: i64,
    pub end: i64,
    pub interval: i64,
}

impl TimeAxis {
    pub fn validate(&self) -> RadarResult<()> {
        if self.interval <= 0 {
            return Err(RadarError::inconsistent_time_axis(format!(
                "non-positive interval: {}",
                self.interval
            )));
        }
        if self.end <= self.start {
            return Err(RadarError::inconsistent_time_axis(format!(
                "empty axis: start {} end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Number of steps in `[start, end)`.
    pub fn len(&self) -> usize {
        if self.interval <= 0 || self.end <= self.start {
            return 0;
        }
        ((self.end - self.start + self.interval - 1) / self.interval) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the axis as UTC timestamps.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        (0..self.len() as i64)
            .map(|k| {
                Utc.timestamp_opt(self.start + k * self.interval, 0)
                    .single()
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            })
            .collect()
    }
}

/// One grid point's fetched series: coordinates, the shared axis, and one
/// value vector per requested variable.
#[derive(Debug, Clone)]
pub struct PointSeries {
    pub lat: f64,
    pub lon: f64,
    pub axis: TimeAxis,
    pub values: HashMap<Variable, Vec<f32>>,
}

impl PointSeries {
    /// Series values for `variable`, checked against the axis length.
    pub fn series(&self, variable: Variable) -> RadarResult<&[f32]> {
        let values = self.values.get(&variable).ok_or_else(|| {
            RadarError::inconsistent_time_axis(format!(
                "point ({}, {}) has no series for {}",
                self.lat, self.lon, variable
            ))
        })?;
        if values.len() != self.axis.len() {
            return Err(RadarError::inconsistent_time_axis(format!(
                "point ({}, {}) {} series has {} values for a {}-step axis",
                self.lat,
                self.lon,
                variable,
                values.len(),
                self.axis.len()
            )));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_len_and_timestamps() {
        let axis = TimeAxis {
            start: 0,
            end: 24 * 3600,
            interval: 3600,
        };
        assert_eq!(axis.len(), 24);

        let times = axis.timestamps();
        assert_eq!(times.len(), 24);
        assert_eq!(times[0].timestamp(), 0);
        assert_eq!(times[23].timestamp(), 23 * 3600);
    }

    #[test]
    fn test_axis_validation() {
        assert!(TimeAxis {
            start: 0,
            end: 0,
            interval: 3600
        }
        .validate()
        .is_err());
        assert!(TimeAxis {
            start: 0,
            end: 3600,
            interval: 0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_series_length_checked() {
        let axis = TimeAxis {
            start: 0,
            end: 3 * 3600,
            interval: 3600,
        };
        let mut values = HashMap::new();
        values.insert(Variable::Precipitation, vec![0.0, 1.0]);

        let point = PointSeries {
            lat: 40.0,
            lon: -4.0,
            axis,
            values,
        };
        assert!(matches!(
            point.series(Variable::Precipitation),
            Err(RadarError::InconsistentTimeAxis(_))
        ));
        assert!(point.series(Variable::Temperature).is_err());
    }
}
