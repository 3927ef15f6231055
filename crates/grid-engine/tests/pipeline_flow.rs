//! Planner -> assembler -> interpolation flow over a synthetic fetch.

use std::collections::HashMap;

use grid_engine::{
    CubeAssembler, GridPlanner, InterpolationEngine, InterpolationMethod, PointSeries, TimeAxis,
};
use radar_common::{BoundingBox, Variable};

/// Build the batch a provider would return for a 10x10 grid and 24 hourly
/// steps: all zero except 5 mm at (40.5, -3.5), hour 12.
fn spike_batch(grid: &grid_engine::SampleGrid) -> Vec<PointSeries> {
    let axis = TimeAxis {
        start: 1_754_006_400, // 2025-08-01T00:00:00Z
        end: 1_754_006_400 + 24 * 3600,
        interval: 3600,
    };

    grid.points()
        .map(|(lat, lon)| {
            let mut series = vec![0f32; 24];
            if (lat - 40.5).abs() < 1e-9 && (lon + 3.5).abs() < 1e-9 {
                series[12] = 5.0;
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

#[test]
fn test_spike_survives_full_pipeline() {
    let bbox = BoundingBox::new(40.0, 41.0, -4.0, -3.0).unwrap();
    let grid = GridPlanner::plan(&bbox, 100, 0.01).unwrap();
    assert_eq!((grid.lats.len(), grid.lons.len()), (10, 10));

    let batch = spike_batch(&grid);
    let cubes =
        CubeAssembler::assemble(&batch, &grid, &[Variable::Precipitation], "synthetic").unwrap();
    let cube = &cubes[&Variable::Precipitation];

    // Raw cube: the spike sits exactly at (t=12, i=5, j=5).
    assert_eq!(cube.value_at(12, 5, 5), 5.0);

    let dense =
        InterpolationEngine::interpolate(cube, 0.01, InterpolationMethod::Linear).unwrap();
    let (n_times, n_lats, n_lons) = dense.shape();
    assert_eq!(n_times, 24);
    // Closed range [40.0, 40.9] at 0.01 degrees.
    assert_eq!(n_lats, 91);
    assert_eq!(n_lons, 91);

    // Linear resampling preserves source grid nodes: (40.5, -3.5) lands on
    // dense index (50, 50).
    assert!((dense.lats[50] - 40.5).abs() < 1e-9);
    assert!((dense.value_at(12, 50, 50) - 5.0).abs() < 1e-4);

    // Hours without rain stay dry, and no cell anywhere goes negative.
    let plane = n_lats * n_lons;
    assert!(dense.data()[11 * plane..12 * plane].iter().all(|v| *v == 0.0));
    assert!(dense.data().iter().all(|v| *v >= 0.0));

    // Mass concentrates around the spike: neighbors interpolate below it.
    assert!(dense.value_at(12, 50, 55) < 5.0);
    assert!(dense.value_at(12, 50, 45) > 0.0);
}
