//! Raster rendering for gridded weather data.
//!
//! Two artifact kinds come out of this crate:
//! - **Preview**: a color-mapped RGBA PNG for map display, no geospatial
//!   metadata embedded.
//! - **Export**: a single-band float32 GeoTIFF carrying WGS84 georeferencing
//!   for download/analysis.
//!
//! Both encoders are written against the byte formats directly (flate2 for
//! the compressed streams, crc32fast for checksums) instead of pulling in a
//! full imaging stack.

pub mod geotiff;
pub mod gradient;
pub mod png;

pub use gradient::{render_preview, ColorRamp, RenderSpec, Rgba};
