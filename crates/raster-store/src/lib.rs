//! Raster artifact caching and durable persistence.
//!
//! `RasterCache::get_or_render` is the single entry point:
//!
//! ```text
//! get_or_render(key, frame, spec)
//!      │
//!      ├─► LayerMemo (in-process, lru) ── hit: no I/O
//!      │
//!      ├─► DurableRasterStore::lookup_preview ── hit: stored URL,
//!      │        read errors degrade to a miss       no pixels touched
//!      │
//!      └─► render preview synchronously, return it inline,
//!          submit a PersistQueue job that renders the GeoTIFF and
//!          uploads both artifacts in the background
//! ```
//!
//! Background failures are logged and dropped; the caller always got its
//! preview before the queue was involved.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod key;
pub mod memo;
pub mod object;
pub mod persist;
pub mod store;

pub use cache::{FrameRenderer, PreviewRenderer, RasterArtifact, RasterCache, RasterCacheConfig, RasterHandles};
pub use config::RasterStoreConfig;
pub use key::RasterKey;
pub use store::{DurableRasterStore, RemoteRasterStore};
