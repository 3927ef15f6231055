//! Assembly of per-point series into dense space-time cubes.

use chrono::{DateTime, Duration, Utc};
use radar_common::{RadarError, RadarResult, Variable};
use std::collections::HashMap;

use crate::grid::SampleGrid;
use crate::series::PointSeries;

/// Coordinate tolerance when checking that a fetched point sits on its
/// expected grid slot.
const COORD_EPS: f64 = 1e-6;

/// Provenance attributes carried by a cube.
#[derive(Debug, Clone)]
pub struct CubeAttrs {
    pub source: String,
    pub crs: String,
    pub processing: String,
}

impl CubeAttrs {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            crs: "EPSG:4326".to_string(),
            processing: String::new(),
        }
    }
}

/// A dense `(time, lat, lon)` cube for one variable.
///
/// Data is a single flat buffer in row-major order with time as the
/// slowest axis and longitude the fastest. Both spatial axes ascend.
/// Immutable after assembly.
#[derive(Debug, Clone)]
pub struct VariableCube {
    pub variable: Variable,
    pub times: Vec<DateTime<Utc>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub attrs: CubeAttrs,
    data: Vec<f32>,
}

impl VariableCube {
    pub fn new(
        variable: Variable,
        times: Vec<DateTime<Utc>>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        data: Vec<f32>,
        attrs: CubeAttrs,
    ) -> RadarResult<Self> {
        if data.len() != times.len() * lats.len() * lons.len() {
            return Err(RadarError::inconsistent_time_axis(format!(
                "cube buffer has {} values for shape ({}, {}, {})",
                data.len(),
                times.len(),
                lats.len(),
                lons.len()
            )));
        }
        Ok(Self {
            variable,
            times,
            lats,
            lons,
            attrs,
            data,
        })
    }

    /// Shape as `(n_times, n_lats, n_lons)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.times.len(), self.lats.len(), self.lons.len())
    }

    /// Value at `(time index, lat index, lon index)`.
    pub fn value_at(&self, t: usize, i: usize, j: usize) -> f32 {
        let (_, n_lats, n_lons) = self.shape();
        debug_assert!(i < n_lats && j < n_lons);
        self.data[(t * n_lats + i) * n_lons + j]
    }

    /// Borrowed spatial slice for one time step.
    pub fn frame(&self, t: usize) -> Option<GridFrame<'_>> {
        let (n_times, n_lats, n_lons) = self.shape();
        if t >= n_times {
            return None;
        }
        let plane = n_lats * n_lons;
        Some(GridFrame {
            lats: &self.lats,
            lons: &self.lons,
            values: &self.data[t * plane..(t + 1) * plane],
        })
    }

    /// Index of the time step nearest to `when`, with its distance.
    pub fn nearest_time_index(&self, when: DateTime<Utc>) -> Option<(usize, Duration)> {
        self.times
            .iter()
            .enumerate()
            .map(|(idx, &t)| {
                let delta = if t > when { t - when } else { when - t };
                (idx, delta)
            })
            .min_by_key(|&(_, delta)| delta)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Clamp every value below `floor` up to `floor`. Used for rate
    /// variables where interpolation overshoot is unphysical.
    pub(crate) fn clamp_min(&mut self, floor: f32) {
        for v in &mut self.data {
            if *v < floor {
                *v = floor;
            }
        }
    }
}

/// A borrowed 2-D `(lat, lon)` slice of a cube, row-major, lat ascending.
#[derive(Debug, Clone, Copy)]
pub struct GridFrame<'a> {
    pub lats: &'a [f64],
    pub lons: &'a [f64],
    pub values: &'a [f32],
}

/// Reshapes flat per-point series into canonical cubes.
pub struct CubeAssembler;

impl CubeAssembler {
    /// Build one cube per requested variable from a row-major point list.
    ///
    /// The reshape from `(point, time)` to `(lat, lon, time)` is only valid
    /// because the fetch iterates latitude-major; that assumption is
    /// asserted here against each series' own coordinates rather than
    /// trusted silently.
    pub fn assemble(
        series: &[PointSeries],
        grid: &SampleGrid,
        variables: &[Variable],
        source: &str,
    ) -> RadarResult<HashMap<Variable, VariableCube>> {
        let n_lats = grid.lats.len();
        let n_lons = grid.lons.len();
        let n_points = grid.len();

        if series.len() != n_points {
            return Err(RadarError::IncompletePointSet {
                requested: n_points,
                returned: series.len(),
            });
        }

        let axis = series[0].axis;
        axis.validate()?;
        let times = axis.timestamps();
        let n_times = times.len();

        for (idx, point) in series.iter().enumerate() {
            let (want_lat, want_lon) = grid
                .point_at(idx)
                .ok_or_else(|| RadarError::invalid_region("empty sample grid"))?;
            if (point.lat - want_lat).abs() > COORD_EPS || (point.lon - want_lon).abs() > COORD_EPS
            {
                return Err(RadarError::PointOrderMismatch {
                    index: idx,
                    lat: point.lat,
                    lon: point.lon,
                });
            }
            if point.axis != axis {
                return Err(RadarError::inconsistent_time_axis(format!(
                    "point {} axis {:?} differs from shared axis {:?}",
                    idx, point.axis, axis
                )));
            }
        }

        let mut cubes = HashMap::with_capacity(variables.len());
        for &variable in variables {
            // (n_points, n_times) buffer, one row per point.
            let mut buffer = vec![0f32; n_points * n_times];
            for (idx, point) in series.iter().enumerate() {
                let values = point.series(variable)?;
                buffer[idx * n_times..(idx + 1) * n_times].copy_from_slice(values);
            }

            // Reshape (lat, lon, time) then transpose to (time, lat, lon).
            let mut data = vec![0f32; n_times * n_points];
            for t in 0..n_times {
                for i in 0..n_lats {
                    for j in 0..n_lons {
                        data[(t * n_lats + i) * n_lons + j] =
                            buffer[(i * n_lons + j) * n_times + t];
                    }
                }
            }

            cubes.insert(
                variable,
                VariableCube::new(
                    variable,
                    times.clone(),
                    grid.lats.clone(),
                    grid.lons.clone(),
                    data,
                    CubeAttrs::new(source),
                )?,
            );
        }

        Ok(cubes)
    }
}
