//! Bulk raster export service.
//!
//! Fetches one dense precipitation cube for the requested window and writes
//! an archive of georeferenced frames, one per interval step.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use exporter::BulkExporter;
use grid_engine::InterpolationMethod;
use pipeline::{ForecastFacade, PipelineConfig};
use provider::{OpenMeteoConfig, OpenMeteoProvider};
use radar_common::time::parse_utc;
use radar_common::{BoundingBox, TimeRange, Variable};

#[derive(Parser, Debug)]
#[command(name = "bulk-export")]
#[command(about = "Bulk GeoTIFF export for meteo-radar")]
struct Args {
    /// Region as "min_lat,max_lat,min_lon,max_lon"
    #[arg(long)]
    bbox: String,

    /// Window start (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// Window end (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    end: String,

    /// Hours between exported frames
    #[arg(long, default_value_t = 6)]
    interval_hours: u32,

    /// Output grid resolution in degrees
    #[arg(long, default_value_t = 0.01)]
    resolution: f64,

    /// Interpolation method: nearest, linear or cubic
    #[arg(long, default_value = "linear")]
    method: String,

    /// Point-data forecast endpoint
    #[arg(long, env = "POINT_PROVIDER_FORECAST_URL")]
    forecast_url: Option<String>,

    /// Point-data archive endpoint
    #[arg(long, env = "POINT_PROVIDER_ARCHIVE_URL")]
    archive_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Variable::validate_mapping()?;

    let bbox = BoundingBox::parse(&args.bbox)?;
    let window = TimeRange::new(parse_utc(&args.start)?, parse_utc(&args.end)?)?;
    let method: InterpolationMethod = args.method.parse()?;

    let mut provider_config = OpenMeteoConfig::default();
    if let Some(url) = args.forecast_url {
        provider_config.forecast_url = url;
    }
    if let Some(url) = args.archive_url {
        provider_config.archive_url = url;
    }

    info!(
        bbox = %args.bbox,
        start = %window.start,
        end = %window.end,
        interval_hours = args.interval_hours,
        "starting bulk export"
    );

    let provider = OpenMeteoProvider::new(provider_config)?;
    let facade = ForecastFacade::new(
        provider,
        PipelineConfig {
            target_resolution: args.resolution,
            method,
            variables: vec![Variable::Precipitation],
            ..PipelineConfig::default()
        },
    );

    let exporter = BulkExporter::new(facade);
    let (archive_path, frames) = exporter.export(&bbox, &window, args.interval_hours).await?;

    info!(
        archive = %archive_path.display(),
        frames,
        "bulk export finished"
    );
    println!("{}", archive_path.display());

    Ok(())
}
