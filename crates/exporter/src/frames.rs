//! Frame selection and GeoTIFF writing for bulk export.

use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use grid_engine::VariableCube;
use radar_common::{RadarResult, TimeRange};
use tracing::debug;

/// Write one GeoTIFF per step of `window` into `dir`.
///
/// Steps start at the window's floor-to-day boundary and advance by
/// `interval_hours` up to the window end inclusive. Each step takes the
/// cube's nearest time slice; a step whose nearest slice lies outside
/// `tolerance` is skipped, not fatal. Files land in an implicit
/// `YYYY/MM/DD/` tree as `{YYYY}_{MM}_{DD}_{HH}_{mm}.tif`.
///
/// Returns the number of frames written.
pub fn write_frames(
    cube: &VariableCube,
    window: &TimeRange,
    interval_hours: u32,
    tolerance: Duration,
    dir: &Path,
) -> RadarResult<usize> {
    let mut count = 0usize;
    let mut step = floor_to_day(window.start);

    while step <= window.end {
        match cube.nearest_time_index(step) {
            Some((idx, distance)) if distance <= tolerance => {
                if let Some(frame) = cube.frame(idx) {
                    let encoded =
                        renderer::geotiff::encode_gray32(frame.lats, frame.lons, frame.values)?;

                    let day_dir = dir.join(step.format("%Y/%m/%d").to_string());
                    std::fs::create_dir_all(&day_dir)?;

                    let filename = format!("{}.tif", step.format("%Y_%m_%d_%H_%M"));
                    std::fs::write(day_dir.join(filename), encoded)?;
                    count += 1;
                }
            }
            _ => {
                debug!(step = %step, "no slice within tolerance, skipping frame");
            }
        }
        step += Duration::hours(interval_hours as i64);
    }

    Ok(count)
}

/// Midnight of the timestamp's UTC day.
fn floor_to_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &dt.date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_engine::GridPlanner;
    use radar_common::time::parse_utc;
    use radar_common::BoundingBox;

    fn test_cube(fetch_start: &str, fetch_end: &str) -> VariableCube {
        let bbox = BoundingBox::new(40.0, 41.0, -4.0, -3.0).unwrap();
        let grid = GridPlanner::plan(&bbox, 25, 0.01).unwrap();
        let window = TimeRange::new(
            parse_utc(fetch_start).unwrap(),
            parse_utc(fetch_end).unwrap(),
        )
        .unwrap();
        test_utils::ramp_cube(&grid, &window)
    }

    #[test]
    fn test_two_day_window_six_hour_interval_yields_eight_frames() {
        let cube = test_cube("2026-08-01", "2026-08-03");
        let window = TimeRange::new(
            parse_utc("2026-08-01T00:00:00Z").unwrap(),
            parse_utc("2026-08-02T18:00:00Z").unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let count = write_frames(&cube, &window, 6, Duration::minutes(30), dir.path()).unwrap();

        assert_eq!(count, 8);
        assert!(dir
            .path()
            .join("2026/08/01/2026_08_01_06_00.tif")
            .exists());
        assert!(dir
            .path()
            .join("2026/08/02/2026_08_02_18_00.tif")
            .exists());
    }

    #[test]
    fn test_steps_without_matching_slice_are_skipped() {
        // The cube only covers the second day; all first-day steps miss.
        let cube = test_cube("2026-08-02", "2026-08-03");
        let window = TimeRange::new(
            parse_utc("2026-08-01T00:00:00Z").unwrap(),
            parse_utc("2026-08-02T18:00:00Z").unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let count = write_frames(&cube, &window, 6, Duration::minutes(30), dir.path()).unwrap();

        assert_eq!(count, 4);
        assert!(!dir.path().join("2026/08/01").exists());
        assert!(dir
            .path()
            .join("2026/08/02/2026_08_02_00_00.tif")
            .exists());
    }

    #[test]
    fn test_steps_start_at_day_boundary() {
        // A mid-day window start is floored to midnight before stepping.
        let cube = test_cube("2026-08-01", "2026-08-02");
        let window = TimeRange::new(
            parse_utc("2026-08-01T07:30:00Z").unwrap(),
            parse_utc("2026-08-01T23:00:00Z").unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let count = write_frames(&cube, &window, 12, Duration::minutes(30), dir.path()).unwrap();

        // Steps: 00:00 and 12:00.
        assert_eq!(count, 2);
        assert!(dir
            .path()
            .join("2026/08/01/2026_08_01_00_00.tif")
            .exists());
    }

    #[test]
    fn test_written_frames_are_valid_tiffs() {
        let cube = test_cube("2026-08-01", "2026-08-02");
        let window = TimeRange::new(
            parse_utc("2026-08-01T00:00:00Z").unwrap(),
            parse_utc("2026-08-01T00:00:00Z").unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_frames(&cube, &window, 6, Duration::minutes(30), dir.path()).unwrap();

        let bytes = std::fs::read(dir.path().join("2026/08/01/2026_08_01_00_00.tif")).unwrap();
        assert_eq!(&bytes[0..2], b"II");
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 42);
    }
}
