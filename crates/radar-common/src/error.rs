//! Error types for meteo-radar services.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for the grid acquisition and raster pipeline.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Region / grid errors ===
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("insufficient grid for interpolation: {0}")]
    InsufficientGrid(String),

    // === Provider errors ===
    #[error("point data provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("incomplete point set: requested {requested} points, provider returned {returned}")]
    IncompletePointSet { requested: usize, returned: usize },

    #[error("inconsistent time axis: {0}")]
    InconsistentTimeAxis(String),

    #[error("point {index} violates grid ordering: got ({lat}, {lon})")]
    PointOrderMismatch { index: usize, lat: f64, lon: f64 },

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    // === Rendering errors ===
    #[error("rendering failed: {0}")]
    RenderFailed(String),

    // === Storage errors ===
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl RadarError {
    /// Create an InvalidRegion error.
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create an InsufficientGrid error.
    pub fn insufficient_grid(msg: impl Into<String>) -> Self {
        Self::InsufficientGrid(msg.into())
    }

    /// Create a ProviderUnavailable error.
    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create an InconsistentTimeAxis error.
    pub fn inconsistent_time_axis(msg: impl Into<String>) -> Self {
        Self::InconsistentTimeAxis(msg.into())
    }

    /// Create a RenderFailed error.
    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    /// Create a PersistenceFailure error.
    pub fn persistence_failure(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        RadarError::PersistenceFailure(err.to_string())
    }
}
