//! Cache keys and deterministic artifact filenames.

use chrono::{DateTime, Utc};
use radar_common::{BoundingBox, Variable};
use std::fmt;

/// Identifies one raster artifact pair: a region (rounded to 2 decimal
/// degrees), a variable, and a timestamp.
///
/// Everything derived from a key is deterministic, which is what makes
/// concurrent duplicate renders harmless: they overwrite the same filenames
/// with the same content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterKey {
    pub bbox: BoundingBox,
    pub variable: Variable,
    pub timestamp: DateTime<Utc>,
}

impl RasterKey {
    pub fn new(bbox: BoundingBox, variable: Variable, timestamp: DateTime<Utc>) -> Self {
        Self {
            bbox,
            variable,
            timestamp,
        }
    }

    /// 8-hex-character digest of the rounded region.
    pub fn region_hash(&self) -> String {
        self.bbox.region_hash()
    }

    /// Filename without extension: `{YYYYMMDD_HHMM}_{variable}_{hash}`.
    pub fn filename_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.timestamp.format("%Y%m%d_%H%M"),
            self.variable.name(),
            self.region_hash()
        )
    }

    pub fn filename(&self, ext: &str) -> String {
        format!("{}{}", self.filename_stem(), ext)
    }
}

impl fmt::Display for RasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename_stem())
    }
}
