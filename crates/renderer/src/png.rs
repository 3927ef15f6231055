//! PNG encoding for RGBA pixel data.
//!
//! Previews only ever need truecolor-with-alpha output, so this encoder
//! writes color type 6 with filter 0 scanlines and a single zlib-compressed
//! IDAT chunk.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use radar_common::{RadarError, RadarResult};
use std::io::Write;

/// PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Encode RGBA pixels (4 bytes per pixel, row-major) as a PNG file.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> RadarResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RadarError::render_failed("empty image"));
    }
    if pixels.len() != width * height * 4 {
        return Err(RadarError::render_failed(format!(
            "pixel buffer has {} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }

    let mut out = Vec::with_capacity(pixels.len() / 4 + 64);
    out.extend_from_slice(&PNG_SIGNATURE);

    // IHDR: dimensions, 8-bit depth, color type 6 (RGBA), default methods.
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);
    write_chunk(&mut out, b"IHDR", &ihdr);

    // IDAT: filter byte 0 before each scanline, zlib-compressed.
    let mut raw = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks_exact(width * 4) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| RadarError::render_failed(format!("deflate failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| RadarError::render_failed(format!("deflate failed: {}", e)))?;
    write_chunk(&mut out, b"IDAT", &compressed);

    write_chunk(&mut out, b"IEND", &[]);

    Ok(out)
}

/// Write one PNG chunk: length, type, data, CRC over type + data.
fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}
