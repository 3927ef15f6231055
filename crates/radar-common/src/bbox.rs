//! Geographic bounding boxes in WGS84 degrees.

use serde::{Deserialize, Serialize};

use crate::error::{RadarError, RadarResult};

/// A rectangular geographic region in WGS84 latitude/longitude degrees.
///
/// Immutable value object: construction validates the invariants, so a
/// `BoundingBox` held by the pipeline is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> RadarResult<Self> {
        let bbox = Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Parse a CLI/query bbox string: "min_lat,max_lat,min_lon,max_lon".
    pub fn parse(s: &str) -> RadarResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RadarError::invalid_region(format!(
                "expected 'min_lat,max_lat,min_lon,max_lon', got '{}'",
                s
            )));
        }

        let mut values = [0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                RadarError::invalid_region(format!("invalid coordinate '{}'", part))
            })?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }

    fn validate(&self) -> RadarResult<()> {
        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(RadarError::invalid_region(format!(
                "latitude out of range: [{}, {}]",
                self.min_lat, self.max_lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon) {
            return Err(RadarError::invalid_region(format!(
                "longitude out of range: [{}, {}]",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat >= self.max_lat {
            return Err(RadarError::invalid_region(format!(
                "degenerate latitude span: {} >= {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon {
            return Err(RadarError::invalid_region(format!(
                "degenerate longitude span: {} >= {}",
                self.min_lon, self.max_lon
            )));
        }
        Ok(())
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Center point as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Corner string quantized to 2 decimal degrees.
    ///
    /// Near-identical boxes intentionally collapse onto the same string so
    /// they share cache entries.
    pub fn rounded_key(&self) -> String {
        format!(
            "{:.2}_{:.2}_{:.2}_{:.2}",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }

    /// 8-hex-character digest of the quantized corners, used to identify
    /// "the same region" in artifact filenames and the metadata table.
    pub fn region_hash(&self) -> String {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.rounded_key().as_bytes());
        format!("{:08x}", hasher.finalize())
    }
}
