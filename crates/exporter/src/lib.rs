//! Bulk raster export.
//!
//! Walks a time range at a fixed step, selects the nearest cube frame per
//! step, writes one georeferenced file per frame into a `YYYY/MM/DD/` tree
//! and bundles everything into a single `.tar.gz`. The whole window rides
//! on one fetch: a single dense cube is sliced many times rather than
//! fetched per frame.

pub mod archive;
pub mod frames;

use std::path::PathBuf;

use chrono::Duration;
use pipeline::ForecastFacade;
use provider::PointDataProvider;
use radar_common::{BoundingBox, RadarError, RadarResult, TimeRange, Variable};
use tracing::{info, instrument};

pub use archive::archive_frames;
pub use frames::write_frames;

/// Bulk exporter over a forecast facade.
pub struct BulkExporter<P: PointDataProvider> {
    facade: ForecastFacade<P>,
    tolerance: Duration,
}

impl<P: PointDataProvider> BulkExporter<P> {
    pub fn new(facade: ForecastFacade<P>) -> Self {
        Self {
            facade,
            // Slight axis offsets happen when the provider's day boundary
            // and the requested window disagree; half an hour absorbs them
            // without ever matching a neighboring hour.
            tolerance: Duration::minutes(30),
        }
    }

    pub fn with_tolerance_minutes(mut self, minutes: i64) -> Self {
        self.tolerance = Duration::minutes(minutes);
        self
    }

    /// Export precipitation frames for `window` every `interval_hours`.
    ///
    /// Returns the archive path and the number of frames actually written,
    /// which may be less than the theoretical step count when slices fall
    /// outside the matching tolerance. A pipeline failure for the window is
    /// fatal; a missing frame is not.
    #[instrument(skip(self), fields(window = ?window, interval_hours))]
    pub async fn export(
        &self,
        bbox: &BoundingBox,
        window: &TimeRange,
        interval_hours: u32,
    ) -> RadarResult<(PathBuf, usize)> {
        if interval_hours == 0 {
            return Err(RadarError::invalid_region("zero export interval"));
        }

        // The provider works in whole days; extending the fetch by one day
        // guarantees the final day's hours are present in the cube.
        let fetch_window = TimeRange::new(window.start, window.end + Duration::days(1))?;
        let cubes = self.facade.history_view(bbox, &fetch_window, true).await?;
        let cube = cubes.get(&Variable::Precipitation).ok_or_else(|| {
            RadarError::UnknownVariable("precipitation missing from pipeline variables".to_string())
        })?;

        let staging = tempfile::tempdir()?;
        let staging = staging.into_path();
        let frames_dir = staging.join("frames");

        let count = write_frames(cube, window, interval_hours, self.tolerance, &frames_dir)?;

        let archive_path = staging.join(format!(
            "meteo_radar_{}_{}.tar.gz",
            window.start.format("%Y_%m_%d"),
            window.end.format("%Y_%m_%d")
        ));
        archive_frames(&frames_dir, &archive_path)?;

        info!(
            archive = %archive_path.display(),
            frames = count,
            "bulk export complete"
        );
        Ok((archive_path, count))
    }
}
