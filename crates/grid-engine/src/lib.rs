//! Grid acquisition and resampling engine.
//!
//! The pipeline stages living here:
//!
//! ```text
//! BoundingBox + budget
//!      │
//!      ▼
//! GridPlanner::plan ──► SampleGrid (regular lat/lon axes)
//!      │
//!      ▼
//! provider fetch ──► Vec<PointSeries> (row-major, lat-major)
//!      │
//!      ▼
//! CubeAssembler::assemble ──► VariableCube (time, lat, lon)
//!      │
//!      ▼
//! InterpolationEngine::interpolate ──► dense VariableCube
//! ```

pub mod cube;
pub mod grid;
pub mod interpolate;
pub mod series;

pub use cube::{CubeAssembler, CubeAttrs, GridFrame, VariableCube};
pub use grid::{GridPlanner, SampleGrid};
pub use interpolate::{InterpolationEngine, InterpolationMethod};
pub use series::{PointSeries, TimeAxis};
