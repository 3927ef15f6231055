//! External data providers.
//!
//! `PointDataProvider` is the seam between the grid pipeline and whichever
//! service supplies per-point hourly series; `OpenMeteoProvider` is the
//! production implementation. `RadarOverlayClient` is a separate, read-only
//! collaborator serving a pre-rendered national composite image.

pub mod openmeteo;
pub mod overlay;
pub mod response_cache;
pub mod wire;

use async_trait::async_trait;
use grid_engine::{PointSeries, SampleGrid};
use radar_common::{RadarResult, TimeRange, Variable};

/// A provider of batched per-point weather series.
///
/// Implementations must return one entry per grid point in the grid's own
/// row-major order (latitude slower than longitude) with a shared hourly
/// time axis across the batch; `CubeAssembler` re-checks both properties.
#[async_trait]
pub trait PointDataProvider: Send + Sync {
    /// Fetch forecast series for every point of `grid` over `window`.
    async fn fetch_forecast(
        &self,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>>;

    /// Fetch historical series. Providers without a dedicated history
    /// endpoint fall back to the forecast endpoint, which covers the
    /// recent past.
    async fn fetch_history(
        &self,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>> {
        self.fetch_forecast(grid, window, variables).await
    }
}

pub use openmeteo::{OpenMeteoConfig, OpenMeteoProvider};
pub use overlay::RadarOverlayClient;
