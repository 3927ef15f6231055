//! Two-tier raster cache with at-most-once generation per key.

use bytes::Bytes;
use grid_engine::GridFrame;
use renderer::RenderSpec;
use std::sync::Arc;
use tracing::{debug, warn};

use radar_common::RadarResult;

use crate::key::RasterKey;
use crate::memo::LayerMemo;
use crate::persist::{PersistJob, PersistQueue};
use crate::store::DurableRasterStore;

/// Renders one frame to preview bytes. A trait seam so tests can count
/// invocations; `PreviewRenderer` is the production implementation.
pub trait FrameRenderer: Send + Sync {
    fn render_preview(
        &self,
        lats: &[f64],
        lons: &[f64],
        values: &[f32],
        spec: &RenderSpec,
    ) -> RadarResult<Vec<u8>>;
}

/// Color-mapped PNG preview rendering.
pub struct PreviewRenderer;

impl FrameRenderer for PreviewRenderer {
    fn render_preview(
        &self,
        lats: &[f64],
        lons: &[f64],
        values: &[f32],
        spec: &RenderSpec,
    ) -> RadarResult<Vec<u8>> {
        let pixels = renderer::render_preview(lats, lons, values, spec)?;
        renderer::png::encode_rgba(&pixels, lons.len(), lats.len())
    }
}

/// Reference to one artifact: freshly rendered bytes or a stored URL.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterArtifact {
    Inline(Bytes),
    Remote(String),
}

/// The artifact pair for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterHandles {
    pub preview: RasterArtifact,
    pub export: RasterArtifact,
}

/// Tuning knobs for the cache.
#[derive(Debug, Clone)]
pub struct RasterCacheConfig {
    pub memo_capacity: usize,
    pub queue_depth: usize,
    pub persist_concurrency: usize,
}

impl Default for RasterCacheConfig {
    fn default() -> Self {
        Self {
            memo_capacity: 1024,
            queue_depth: 64,
            persist_concurrency: 4,
        }
    }
}

/// Content-addressed cache for rendered raster artifacts.
pub struct RasterCache {
    memo: LayerMemo,
    store: Arc<dyn DurableRasterStore>,
    renderer: Arc<dyn FrameRenderer>,
    persist: PersistQueue,
}

impl RasterCache {
    /// Build a cache and spawn its persistence worker; requires a running
    /// Tokio runtime.
    pub fn new(
        store: Arc<dyn DurableRasterStore>,
        renderer: Arc<dyn FrameRenderer>,
        config: RasterCacheConfig,
    ) -> Self {
        let persist = PersistQueue::start(
            store.clone(),
            config.queue_depth,
            config.persist_concurrency,
        );
        Self {
            memo: LayerMemo::new(config.memo_capacity),
            store,
            renderer,
            persist,
        }
    }

    /// Serve the artifact pair for `key`, rendering at most once.
    ///
    /// Fast path order: in-process memo (no I/O), then the durable store
    /// (no pixel work), then a synchronous preview render whose durable
    /// persistence happens off the request path. A durable lookup error is
    /// downgraded to a miss: a fresh render is always preferable to a
    /// failed request.
    pub async fn get_or_render(
        &self,
        key: &RasterKey,
        frame: GridFrame<'_>,
        spec: &RenderSpec,
    ) -> RadarResult<RasterHandles> {
        let memo_key = key.filename_stem();

        if let Some(handles) = self.memo.get(&memo_key).await {
            debug!(key = %memo_key, "memo hit");
            return Ok(handles);
        }

        match self.store.lookup_preview(key).await {
            Ok(Some(url)) => {
                debug!(key = %memo_key, "durable hit");
                let handles = RasterHandles {
                    preview: RasterArtifact::Remote(url),
                    export: RasterArtifact::Remote(self.store.public_url(&key.filename(".tif"))),
                };
                self.memo.put(memo_key, handles.clone()).await;
                return Ok(handles);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(key = %memo_key, error = %error, "durable lookup failed, rendering fresh");
            }
        }

        let png = self
            .renderer
            .render_preview(frame.lats, frame.lons, frame.values, spec)?;
        let png = Bytes::from(png);

        let handles = RasterHandles {
            preview: RasterArtifact::Inline(png.clone()),
            export: RasterArtifact::Remote(self.store.public_url(&key.filename(".tif"))),
        };
        self.memo.put(memo_key, handles.clone()).await;

        self.persist.submit(PersistJob {
            key: *key,
            preview_png: png,
            lats: frame.lats.to_vec(),
            lons: frame.lons.to_vec(),
            values: frame.values.to_vec(),
        });

        Ok(handles)
    }
}
