//! Orchestration facade for the grid acquisition pipeline.
//!
//! Hides the staging from callers: plan the sample grid, fetch the batched
//! point series, assemble cubes, and (unless raw data was requested)
//! interpolate onto the display resolution. No partial result ever escapes:
//! any stage error aborts the whole view request.

use std::collections::HashMap;

use grid_engine::{
    CubeAssembler, GridPlanner, InterpolationEngine, InterpolationMethod, VariableCube,
};
use provider::PointDataProvider;
use radar_common::{BoundingBox, RadarResult, TimeRange, Variable};
use tracing::{debug, info, instrument};

/// Pipeline tuning parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Point budget per provider request.
    pub max_points: usize,
    /// Coarsest-allowed sampling would be unbounded without a floor; this
    /// caps the worst-case request size for tiny regions.
    pub min_resolution: f64,
    /// Display resolution the cubes are interpolated onto.
    pub target_resolution: f64,
    /// Interpolation method for the upsampling pass.
    pub method: InterpolationMethod,
    /// Variables fetched for every view.
    pub variables: Vec<Variable>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_points: 500,
            min_resolution: 0.05,
            // ~1.1 km at the equator, radar-like display density.
            target_resolution: 0.01,
            method: InterpolationMethod::Linear,
            variables: vec![
                Variable::Precipitation,
                Variable::Temperature,
                Variable::Pressure,
                Variable::WindSpeed,
            ],
        }
    }
}

/// Per-variable cubes for one view request.
pub type CubeSet = HashMap<Variable, VariableCube>;

/// Main application facade over a point-data provider.
pub struct ForecastFacade<P: PointDataProvider> {
    provider: P,
    config: PipelineConfig,
    source_label: String,
}

impl<P: PointDataProvider> ForecastFacade<P> {
    pub fn new(provider: P, config: PipelineConfig) -> Self {
        Self {
            provider,
            config,
            source_label: "open-meteo".to_string(),
        }
    }

    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Forecast cubes for a region and window, interpolated to display
    /// resolution when `high_resolution` is set.
    #[instrument(skip(self), fields(window = ?window))]
    pub async fn forecast_view(
        &self,
        bbox: &BoundingBox,
        window: &TimeRange,
        high_resolution: bool,
    ) -> RadarResult<CubeSet> {
        let grid = GridPlanner::plan(bbox, self.config.max_points, self.config.min_resolution)?;
        debug!(
            points = grid.len(),
            resolution = grid.resolution_deg,
            "planned sample grid"
        );

        let series = self
            .provider
            .fetch_forecast(&grid, window, &self.config.variables)
            .await?;

        self.assemble_and_process(&series, &grid, high_resolution)
    }

    /// Historical cubes; providers without a history endpoint transparently
    /// serve from their forecast data covering the recent past.
    #[instrument(skip(self), fields(window = ?window))]
    pub async fn history_view(
        &self,
        bbox: &BoundingBox,
        window: &TimeRange,
        high_resolution: bool,
    ) -> RadarResult<CubeSet> {
        let grid = GridPlanner::plan(bbox, self.config.max_points, self.config.min_resolution)?;

        let series = self
            .provider
            .fetch_history(&grid, window, &self.config.variables)
            .await?;

        self.assemble_and_process(&series, &grid, high_resolution)
    }

    fn assemble_and_process(
        &self,
        series: &[grid_engine::PointSeries],
        grid: &grid_engine::SampleGrid,
        high_resolution: bool,
    ) -> RadarResult<CubeSet> {
        let cubes =
            CubeAssembler::assemble(series, grid, &self.config.variables, &self.source_label)?;

        if !high_resolution {
            return Ok(cubes);
        }

        let mut dense = HashMap::with_capacity(cubes.len());
        for (variable, cube) in cubes {
            let interpolated = InterpolationEngine::interpolate(
                &cube,
                self.config.target_resolution,
                self.config.method,
            )?;
            dense.insert(variable, interpolated);
        }

        let shape = dense.values().next().map(|c| c.shape());
        info!(?shape, "view cubes ready");
        Ok(dense)
    }
}
