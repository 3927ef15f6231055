//! End-to-end bulk export over a synthetic provider.

use async_trait::async_trait;
use exporter::BulkExporter;
use flate2::read::GzDecoder;
use grid_engine::{InterpolationMethod, PointSeries, SampleGrid};
use pipeline::{ForecastFacade, PipelineConfig};
use provider::PointDataProvider;
use radar_common::time::parse_utc;
use radar_common::{BoundingBox, RadarResult, TimeRange, Variable};
use std::fs::File;

struct SyntheticProvider;

#[async_trait]
impl PointDataProvider for SyntheticProvider {
    async fn fetch_forecast(
        &self,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>> {
        Ok(test_utils::ramp_series(grid, window, variables))
    }
}

fn facade() -> ForecastFacade<SyntheticProvider> {
    ForecastFacade::new(
        SyntheticProvider,
        PipelineConfig {
            max_points: 25,
            min_resolution: 0.01,
            target_resolution: 0.1,
            method: InterpolationMethod::Linear,
            variables: vec![Variable::Precipitation],
        },
    )
}

#[tokio::test]
async fn test_export_produces_archive_and_count() {
    let exporter = BulkExporter::new(facade());
    let bbox = BoundingBox::new(40.0, 41.0, -4.0, -3.0).unwrap();
    let window = TimeRange::new(
        parse_utc("2026-08-01T00:00:00Z").unwrap(),
        parse_utc("2026-08-02T18:00:00Z").unwrap(),
    )
    .unwrap();

    let (archive_path, count) = exporter.export(&bbox, &window, 6).await.unwrap();

    assert_eq!(count, 8);
    assert!(archive_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("meteo_radar_2026_08_01_2026_08_02"));

    let mut archive = tar::Archive::new(GzDecoder::new(File::open(&archive_path).unwrap()));
    let members: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().display().to_string())
        .collect();

    assert_eq!(members.len(), 8);
    assert!(members.contains(&"2026/08/01/2026_08_01_00_00.tif".to_string()));
    assert!(members.contains(&"2026/08/02/2026_08_02_18_00.tif".to_string()));
}

#[tokio::test]
async fn test_zero_interval_rejected() {
    let exporter = BulkExporter::new(facade());
    let bbox = BoundingBox::new(40.0, 41.0, -4.0, -3.0).unwrap();
    let window = TimeRange::new(
        parse_utc("2026-08-01").unwrap(),
        parse_utc("2026-08-02").unwrap(),
    )
    .unwrap();

    assert!(exporter.export(&bbox, &window, 0).await.is_err());
}
