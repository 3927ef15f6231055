//! Minimal GeoTIFF encoding for export artifacts.
//!
//! Writes a little-endian, single-strip, uncompressed float32 TIFF with the
//! three GeoTIFF tags a WGS84 lat/lon raster needs: pixel scale, a top-left
//! tiepoint, and a geokey directory declaring EPSG:4326. That is enough for
//! GIS tools to place the band; styling stays with the preview artifact.

use radar_common::{RadarError, RadarResult};

const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_SAMPLE_FORMAT: u16 = 339;
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// Fallback spacing when an axis has a single sample.
const DEFAULT_RESOLUTION: f64 = 0.01;

/// Encode one `(lat, lon)` slice as a georeferenced single-band GeoTIFF.
///
/// Rows are written north to south; an ascending latitude axis is flipped.
/// The tiepoint anchors the outer edge of the top-left pixel (coordinates
/// name pixel centers, the raster model names edges).
pub fn encode_gray32(lats: &[f64], lons: &[f64], values: &[f32]) -> RadarResult<Vec<u8>> {
    let width = lons.len();
    let height = lats.len();
    if width == 0 || height == 0 || values.len() != width * height {
        return Err(RadarError::render_failed(format!(
            "frame buffer has {} values for a {}x{} grid",
            values.len(),
            width,
            height
        )));
    }

    let lat_res = axis_resolution(lats);
    let lon_res = axis_resolution(lons);
    let max_lat = lats.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_lon = lons.iter().copied().fold(f64::INFINITY, f64::min);

    let strip_len = width * height * 4;
    let ifd_offset = 8 + strip_len;
    let entry_count = 13usize;
    let ifd_len = 2 + entry_count * 12 + 4;
    let scale_offset = ifd_offset + ifd_len;
    let tiepoint_offset = scale_offset + 3 * 8;
    let geokey_offset = tiepoint_offset + 6 * 8;

    let mut out = Vec::with_capacity(geokey_offset + 16 * 2);

    // Header: little-endian marker, magic 42, offset of the first IFD.
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&(ifd_offset as u32).to_le_bytes());

    // Strip data, rows north to south.
    let ascending = lats[0] < lats[height - 1];
    for row in 0..height {
        let src_row = if ascending { height - 1 - row } else { row };
        for col in 0..width {
            out.extend_from_slice(&values[src_row * width + col].to_le_bytes());
        }
    }

    // IFD.
    out.extend_from_slice(&(entry_count as u16).to_le_bytes());
    ifd_entry(&mut out, TAG_IMAGE_WIDTH, TYPE_LONG, 1, width as u32);
    ifd_entry(&mut out, TAG_IMAGE_LENGTH, TYPE_LONG, 1, height as u32);
    ifd_entry(&mut out, TAG_BITS_PER_SAMPLE, TYPE_SHORT, 1, 32);
    ifd_entry(&mut out, TAG_COMPRESSION, TYPE_SHORT, 1, 1);
    ifd_entry(&mut out, TAG_PHOTOMETRIC, TYPE_SHORT, 1, 1);
    ifd_entry(&mut out, TAG_STRIP_OFFSETS, TYPE_LONG, 1, 8);
    ifd_entry(&mut out, TAG_SAMPLES_PER_PIXEL, TYPE_SHORT, 1, 1);
    ifd_entry(&mut out, TAG_ROWS_PER_STRIP, TYPE_LONG, 1, height as u32);
    ifd_entry(&mut out, TAG_STRIP_BYTE_COUNTS, TYPE_LONG, 1, strip_len as u32);
    ifd_entry(&mut out, TAG_SAMPLE_FORMAT, TYPE_SHORT, 1, 3);
    ifd_entry(
        &mut out,
        TAG_MODEL_PIXEL_SCALE,
        TYPE_DOUBLE,
        3,
        scale_offset as u32,
    );
    ifd_entry(
        &mut out,
        TAG_MODEL_TIEPOINT,
        TYPE_DOUBLE,
        6,
        tiepoint_offset as u32,
    );
    ifd_entry(
        &mut out,
        TAG_GEO_KEY_DIRECTORY,
        TYPE_SHORT,
        16,
        geokey_offset as u32,
    );
    out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

    // ModelPixelScale: (sx, sy, sz).
    for v in [lon_res, lat_res, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    // ModelTiepoint: raster (0, 0, 0) -> top-left pixel edge.
    let origin_lon = min_lon - lon_res / 2.0;
    let origin_lat = max_lat + lat_res / 2.0;
    for v in [0.0, 0.0, 0.0, origin_lon, origin_lat, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    // GeoKeyDirectory: geographic model, pixel-is-area, WGS84.
    for v in [
        1u16, 1, 0, 3, // header: version, revision 1.0, 3 keys
        1024, 0, 1, 2, // GTModelType = geographic
        1025, 0, 1, 1, // GTRasterType = pixel is area
        2048, 0, 1, 4326, // GeographicType = WGS84
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    Ok(out)
}

fn axis_resolution(axis: &[f64]) -> f64 {
    if axis.len() > 1 {
        ((axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64).abs()
    } else {
        DEFAULT_RESOLUTION
    }
}

fn ifd_entry(out: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&field_type.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}
