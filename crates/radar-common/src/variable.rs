//! Meteorological variables and their provider-name mapping.
//!
//! The point-data provider exposes its own parameter names; internally we
//! use a fixed enumeration so an unknown or misspelled name fails loudly at
//! the boundary instead of producing an empty layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RadarError, RadarResult};

/// Variables the pipeline knows how to fetch, assemble and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Precipitation,
    Temperature,
    Pressure,
    WindSpeed,
    CloudCover,
}

impl Variable {
    /// All supported variables.
    pub fn all() -> &'static [Variable] {
        &[
            Variable::Precipitation,
            Variable::Temperature,
            Variable::Pressure,
            Variable::WindSpeed,
            Variable::CloudCover,
        ]
    }

    /// Internal name, used in filenames and the metadata table.
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Precipitation => "precipitation",
            Variable::Temperature => "temperature",
            Variable::Pressure => "pressure",
            Variable::WindSpeed => "wind_speed",
            Variable::CloudCover => "cloud_cover",
        }
    }

    /// Parameter name in the point-data provider's hourly block.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Variable::Precipitation => "precipitation",
            Variable::Temperature => "temperature_2m",
            Variable::Pressure => "surface_pressure",
            Variable::WindSpeed => "wind_speed_10m",
            Variable::CloudCover => "cloud_cover",
        }
    }

    pub fn from_name(name: &str) -> RadarResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.name() == name)
            .ok_or_else(|| RadarError::UnknownVariable(name.to_string()))
    }

    pub fn from_provider_name(name: &str) -> RadarResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.provider_name() == name)
            .ok_or_else(|| RadarError::UnknownVariable(name.to_string()))
    }

    /// Rates and accumulated amounts cannot be negative; interpolation
    /// overshoot for these variables is clamped at zero.
    pub fn is_rate(&self) -> bool {
        matches!(self, Variable::Precipitation)
    }

    /// Verify the name mappings are bijective. Run once at startup.
    pub fn validate_mapping() -> RadarResult<()> {
        for v in Self::all() {
            if Self::from_name(v.name())? != *v {
                return Err(RadarError::UnknownVariable(format!(
                    "internal name '{}' does not round-trip",
                    v.name()
                )));
            }
            if Self::from_provider_name(v.provider_name())? != *v {
                return Err(RadarError::UnknownVariable(format!(
                    "provider name '{}' does not round-trip",
                    v.provider_name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_bijective() {
        Variable::validate_mapping().unwrap();
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!(matches!(
            Variable::from_name("humidity"),
            Err(RadarError::UnknownVariable(_))
        ));
        assert!(Variable::from_provider_name("rain").is_err());
    }

    #[test]
    fn test_rate_clamp_policy() {
        assert!(Variable::Precipitation.is_rate());
        assert!(!Variable::Temperature.is_rate());
    }
}
