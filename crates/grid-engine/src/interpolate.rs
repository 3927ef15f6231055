//! Spatial upsampling of cubes onto denser regular grids.

use radar_common::{RadarError, RadarResult};
use rayon::prelude::*;
use std::str::FromStr;

use crate::cube::VariableCube;

/// Interpolation method for spatial resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMethod {
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl InterpolationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMethod::Nearest => "nearest",
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Cubic => "cubic",
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(InterpolationMethod::Nearest),
            "linear" => Ok(InterpolationMethod::Linear),
            "cubic" => Ok(InterpolationMethod::Cubic),
            other => Err(RadarError::insufficient_grid(format!(
                "unknown interpolation method: {}",
                other
            ))),
        }
    }
}

/// Resamples cubes to a target spatial resolution.
pub struct InterpolationEngine;

impl InterpolationEngine {
    /// Resample `cube` onto axes spanning the same closed lat/lon range at
    /// `target_resolution_deg`, independently per time slice.
    ///
    /// The output grid is always fully populated: queries at the domain
    /// edges extrapolate instead of producing missing values, because
    /// downstream rendering assumes a dense array. Rate variables are
    /// clamped at zero afterwards so interpolation overshoot never yields
    /// negative physical quantities.
    pub fn interpolate(
        cube: &VariableCube,
        target_resolution_deg: f64,
        method: InterpolationMethod,
    ) -> RadarResult<VariableCube> {
        let (n_times, n_lats, n_lons) = cube.shape();

        if n_lats < 2 || n_lons < 2 {
            return Err(RadarError::insufficient_grid(format!(
                "need at least 2 samples per spatial axis, got {}x{}",
                n_lats, n_lons
            )));
        }
        if target_resolution_deg <= 0.0 {
            return Err(RadarError::insufficient_grid(format!(
                "non-positive target resolution: {}",
                target_resolution_deg
            )));
        }

        let new_lats = closed_axis(cube.lats[0], cube.lats[n_lats - 1], target_resolution_deg);
        let new_lons = closed_axis(cube.lons[0], cube.lons[n_lons - 1], target_resolution_deg);

        let plane = n_lats * n_lons;
        let slices: Vec<Vec<f32>> = (0..n_times)
            .into_par_iter()
            .map(|t| {
                resample_slice(
                    &cube.data()[t * plane..(t + 1) * plane],
                    &cube.lats,
                    &cube.lons,
                    &new_lats,
                    &new_lons,
                    method,
                )
            })
            .collect();

        let mut data = Vec::with_capacity(n_times * new_lats.len() * new_lons.len());
        for slice in slices {
            data.extend_from_slice(&slice);
        }

        let mut attrs = cube.attrs.clone();
        attrs.processing = format!(
            "interpolated {} at {} deg",
            method.as_str(),
            target_resolution_deg
        );

        let mut dense = VariableCube::new(
            cube.variable,
            cube.times.clone(),
            new_lats,
            new_lons,
            data,
            attrs,
        )?;

        if cube.variable.is_rate() {
            dense.clamp_min(0.0);
        }

        Ok(dense)
    }
}

/// Axis from `first` to `last` inclusive at `step`.
///
/// Inclusive construction matters: re-deriving an axis from the extremes
/// of a previous pass reproduces the identical coordinates.
fn closed_axis(first: f64, last: f64, step: f64) -> Vec<f64> {
    let n = (((last - first) / step) + 1e-9).floor() as usize + 1;
    (0..n).map(|k| first + k as f64 * step).collect()
}

fn resample_slice(
    src: &[f32],
    src_lats: &[f64],
    src_lons: &[f64],
    dst_lats: &[f64],
    dst_lons: &[f64],
    method: InterpolationMethod,
) -> Vec<f32> {
    let height = src_lats.len();
    let width = src_lons.len();

    let lat_step = (src_lats[height - 1] - src_lats[0]) / (height - 1) as f64;
    let lon_step = (src_lons[width - 1] - src_lons[0]) / (width - 1) as f64;

    let mut output = Vec::with_capacity(dst_lats.len() * dst_lons.len());
    for &lat in dst_lats {
        let fy = (lat - src_lats[0]) / lat_step;
        for &lon in dst_lons {
            let fx = (lon - src_lons[0]) / lon_step;
            let value = match method {
                InterpolationMethod::Nearest => nearest_sample(src, width, height, fx, fy),
                InterpolationMethod::Linear => bilinear_sample(src, width, height, fx, fy),
                InterpolationMethod::Cubic => cubic_sample(src, width, height, fx, fy),
            };
            output.push(value);
        }
    }
    output
}

/// Value of the nearest grid point, clamped to the domain.
fn nearest_sample(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let col = (x.round() as isize).clamp(0, width as isize - 1) as usize;
    let row = (y.round() as isize).clamp(0, height as isize - 1) as usize;
    data[row * width + col]
}

/// Bilinear interpolation over the four surrounding points.
///
/// The base cell is clamped into the domain but the fractions are not, so
/// out-of-range positions extrapolate linearly from the edge cell.
fn bilinear_sample(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let x0 = (x.floor() as isize).clamp(0, width as isize - 2) as usize;
    let y0 = (y.floor() as isize).clamp(0, height as isize - 2) as usize;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let tx = (x - x0 as f64) as f32;
    let ty = (y - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - tx) + v10 * tx;
    let bottom = v01 * (1.0 - tx) + v11 * tx;
    top * (1.0 - ty) + bottom * ty
}

/// Bicubic interpolation sampling a 4x4 neighborhood; the window is edge
/// clamped. Falls back to bilinear when the neighborhood contains NaN.
fn cubic_sample(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let xi = x.floor() as isize;
    let yi = y.floor() as isize;

    let tx = (x - xi as f64) as f32;
    let ty = (y - yi as f64) as f32;

    let mut rows = [0f32; 4];
    for (j, row_value) in rows.iter_mut().enumerate() {
        let py = (yi + j as isize - 1).clamp(0, height as isize - 1) as usize;
        let mut samples = [0f32; 4];
        for (i, sample) in samples.iter_mut().enumerate() {
            let px = (xi + i as isize - 1).clamp(0, width as isize - 1) as usize;
            *sample = data[py * width + px];
            if sample.is_nan() {
                return bilinear_sample(data, width, height, x, y);
            }
        }
        *row_value = cubic_1d(samples[0], samples[1], samples[2], samples[3], tx);
    }

    cubic_1d(rows[0], rows[1], rows[2], rows[3], ty)
}

/// 1D cubic interpolation using a Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::CubeAttrs;
    use chrono::{TimeZone, Utc};
    use radar_common::Variable;

    fn cube_from(
        variable: Variable,
        lats: Vec<f64>,
        lons: Vec<f64>,
        frames: Vec<Vec<f32>>,
    ) -> VariableCube {
        let times = (0..frames.len() as i64)
            .map(|h| Utc.timestamp_opt(1_700_000_000 + h * 3600, 0).unwrap())
            .collect();
        let data = frames.into_iter().flatten().collect();
        VariableCube::new(variable, times, lats, lons, data, CubeAttrs::new("test")).unwrap()
    }

    #[test]
    fn test_closed_axis_contains_both_extremes() {
        let axis = closed_axis(40.0, 41.0, 0.25);
        assert_eq!(axis.len(), 5);
        assert!((axis[0] - 40.0).abs() < 1e-12);
        assert!((axis[4] - 41.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_preserves_grid_values() {
        let cube = cube_from(
            Variable::Temperature,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0, 2.0],
            vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]],
        );

        let dense =
            InterpolationEngine::interpolate(&cube, 0.5, InterpolationMethod::Linear).unwrap();
        let (_, n_lats, n_lons) = dense.shape();
        assert_eq!((n_lats, n_lons), (5, 5));

        // Original grid points are preserved exactly.
        assert_eq!(dense.value_at(0, 0, 0), 1.0);
        assert_eq!(dense.value_at(0, 4, 4), 9.0);
        assert_eq!(dense.value_at(0, 2, 2), 5.0);
        // Midpoint between 1 and 2.
        assert!((dense.value_at(0, 0, 1) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_is_idempotent() {
        let cube = cube_from(
            Variable::Temperature,
            vec![10.0, 10.5, 11.0],
            vec![20.0, 20.5, 21.0],
            vec![vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0]],
        );

        let once =
            InterpolationEngine::interpolate(&cube, 0.1, InterpolationMethod::Nearest).unwrap();
        let twice =
            InterpolationEngine::interpolate(&once, 0.1, InterpolationMethod::Nearest).unwrap();

        assert_eq!(once.lats, twice.lats);
        assert_eq!(once.lons, twice.lons);
        for (a, b) in once.data().iter().zip(twice.data()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rate_clamped_non_negative() {
        // A sharp spike surrounded by zeros makes cubic interpolation
        // undershoot below zero between grid points.
        let mut frame = vec![0f32; 25];
        frame[12] = 10.0;
        let cube = cube_from(
            Variable::Precipitation,
            (0..5).map(|i| i as f64 * 0.5).collect(),
            (0..5).map(|i| i as f64 * 0.5).collect(),
            vec![frame],
        );

        let dense =
            InterpolationEngine::interpolate(&cube, 0.1, InterpolationMethod::Cubic).unwrap();
        assert!(dense.data().iter().all(|v| *v >= 0.0));

        // The same shape as a non-rate variable is allowed to undershoot.
        let mut frame = vec![0f32; 25];
        frame[12] = 10.0;
        let temp_cube = cube_from(
            Variable::Temperature,
            (0..5).map(|i| i as f64 * 0.5).collect(),
            (0..5).map(|i| i as f64 * 0.5).collect(),
            vec![frame],
        );
        let temp_dense =
            InterpolationEngine::interpolate(&temp_cube, 0.1, InterpolationMethod::Cubic).unwrap();
        assert!(temp_dense.data().iter().any(|v| *v < 0.0));
    }

    #[test]
    fn test_output_is_fully_populated() {
        let cube = cube_from(
            Variable::Temperature,
            vec![0.0, 0.3],
            vec![0.0, 0.3],
            vec![vec![1.0, 2.0, 3.0, 4.0]],
        );

        for method in [
            InterpolationMethod::Nearest,
            InterpolationMethod::Linear,
            InterpolationMethod::Cubic,
        ] {
            let dense = InterpolationEngine::interpolate(&cube, 0.07, method).unwrap();
            assert!(
                dense.data().iter().all(|v| v.is_finite()),
                "{:?} produced non-finite values",
                method
            );
        }
    }

    #[test]
    fn test_insufficient_grid_rejected() {
        let cube = cube_from(
            Variable::Temperature,
            vec![0.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0]],
        );
        assert!(matches!(
            InterpolationEngine::interpolate(&cube, 0.1, InterpolationMethod::Linear),
            Err(RadarError::InsufficientGrid(_))
        ));
    }

    #[test]
    fn test_processing_attr_recorded() {
        let cube = cube_from(
            Variable::Temperature,
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0, 3.0, 4.0]],
        );
        let dense =
            InterpolationEngine::interpolate(&cube, 0.25, InterpolationMethod::Linear).unwrap();
        assert_eq!(dense.attrs.processing, "interpolated linear at 0.25 deg");
        assert_eq!(dense.attrs.crs, "EPSG:4326");
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "cubic".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::Cubic
        );
        assert!("bicubic".parse::<InterpolationMethod>().is_err());
    }
}
