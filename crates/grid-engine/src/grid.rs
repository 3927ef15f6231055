//! Sample grid planning under a point budget.

use radar_common::{BoundingBox, RadarError, RadarResult};
use serde::{Deserialize, Serialize};

/// A regular lat/lon sample grid derived from a bounding box.
///
/// Both axes are ascending. Point iteration order is row-major with
/// latitude as the slow axis; `CubeAssembler` depends on this ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleGrid {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub resolution_deg: f64,
}

impl SampleGrid {
    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lats.is_empty() || self.lons.is_empty()
    }

    /// Iterate `(lat, lon)` pairs in row-major order: latitude varies
    /// slower than longitude.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lats
            .iter()
            .flat_map(move |&lat| self.lons.iter().map(move |&lon| (lat, lon)))
    }

    /// Expected coordinates for the point at flat index `idx`.
    pub fn point_at(&self, idx: usize) -> Option<(f64, f64)> {
        let n_lons = self.lons.len();
        if n_lons == 0 || idx >= self.len() {
            return None;
        }
        Some((self.lats[idx / n_lons], self.lons[idx % n_lons]))
    }
}

/// Plans sample grids so that provider queries stay within budget.
pub struct GridPlanner;

impl GridPlanner {
    /// Compute a regular grid over `bbox` with at most `max_points` points
    /// and a resolution no finer than `min_resolution` degrees.
    ///
    /// The base resolution is `sqrt(area / max_points)`; because axis
    /// lengths round up, skewed boxes can overshoot the budget, so the
    /// step is coarsened until the product fits.
    pub fn plan(
        bbox: &BoundingBox,
        max_points: usize,
        min_resolution: f64,
    ) -> RadarResult<SampleGrid> {
        let lat_span = bbox.height();
        let lon_span = bbox.width();

        if lat_span <= 0.0 || lon_span <= 0.0 {
            return Err(RadarError::invalid_region(format!(
                "degenerate bbox spans: {} x {}",
                lat_span, lon_span
            )));
        }
        if max_points == 0 {
            return Err(RadarError::invalid_region("point budget is zero"));
        }
        if min_resolution <= 0.0 {
            return Err(RadarError::invalid_region(format!(
                "non-positive minimum resolution: {}",
                min_resolution
            )));
        }

        let mut resolution = min_resolution.max((lat_span * lon_span / max_points as f64).sqrt());

        let (n_lats, n_lons) = loop {
            let n_lats = axis_len(lat_span, resolution);
            let n_lons = axis_len(lon_span, resolution);
            if n_lats * n_lons <= max_points {
                break (n_lats, n_lons);
            }
            resolution *= 1.05;
        };

        Ok(SampleGrid {
            lats: build_axis(bbox.min_lat, resolution, n_lats),
            lons: build_axis(bbox.min_lon, resolution, n_lons),
            resolution_deg: resolution,
        })
    }
}

/// Number of samples stepping from the minimum bound, exclusive of the
/// maximum: `|{k >= 0 : k * step < span}|`.
fn axis_len(span: f64, step: f64) -> usize {
    (((span / step) - 1e-9).ceil() as usize).max(1)
}

fn build_axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|k| start + k as f64 * step).collect()
}
