//! Synthetic weather-like test data.
//!
//! Generators create predictable, verifiable patterns so tests can assert
//! exact values after reshaping and resampling.

use std::collections::HashMap;

use grid_engine::{CubeAssembler, PointSeries, SampleGrid, TimeAxis, VariableCube};
use radar_common::{TimeRange, Variable};

/// Hourly axis covering `window` (end exclusive).
pub fn hourly_axis(window: &TimeRange) -> TimeAxis {
    TimeAxis {
        start: window.start.timestamp(),
        end: window.end.timestamp(),
        interval: 3600,
    }
}

/// One series per grid point in row-major order, where the value for
/// (point index, time step) is `point_index * 1000 + step`.
///
/// Every cell of an assembled cube is distinct, so tests can verify that
/// `cube[t, i, j]` recovers exactly the value fed for its grid point.
pub fn ramp_series(
    grid: &SampleGrid,
    window: &TimeRange,
    variables: &[Variable],
) -> Vec<PointSeries> {
    let axis = hourly_axis(window);
    grid.points()
        .enumerate()
        .map(|(idx, (lat, lon))| {
            let mut values = HashMap::new();
            for &variable in variables {
                values.insert(
                    variable,
                    (0..axis.len()).map(|t| (idx * 1000 + t) as f32).collect(),
                );
            }
            PointSeries {
                lat,
                lon,
                axis,
                values,
            }
        })
        .collect()
}

/// All-zero precipitation series with a single spike at one point and hour.
pub fn spike_series(
    grid: &SampleGrid,
    window: &TimeRange,
    spike_point: usize,
    spike_step: usize,
    spike_value: f32,
) -> Vec<PointSeries> {
    let axis = hourly_axis(window);
    grid.points()
        .enumerate()
        .map(|(idx, (lat, lon))| {
            let mut series = vec![0f32; axis.len()];
            if idx == spike_point && spike_step < series.len() {
                series[spike_step] = spike_value;
            }
            let mut values = HashMap::new();
            values.insert(Variable::Precipitation, series);
            PointSeries {
                lat,
                lon,
                axis,
                values,
            }
        })
        .collect()
}

/// Assembled precipitation cube with the `ramp_series` pattern.
pub fn ramp_cube(grid: &SampleGrid, window: &TimeRange) -> VariableCube {
    let series = ramp_series(grid, window, &[Variable::Precipitation]);
    CubeAssembler::assemble(&series, grid, &[Variable::Precipitation], "test")
        .expect("synthetic series assemble cleanly")
        .remove(&Variable::Precipitation)
        .expect("precipitation cube present")
}
