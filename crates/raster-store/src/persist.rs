//! Bounded background persistence queue.
//!
//! One job per fresh render: encode the GeoTIFF export, upload both
//! artifacts, register the metadata row. Submission never blocks the
//! request path; there is no cancellation, jobs run to completion or fail
//! silently (logged). At-most-one concurrent generation per key is NOT
//! enforced: a regeneration racing an in-flight job produces a duplicate
//! render of identical files, which idempotent overwrites absorb.

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use radar_common::RadarResult;

use crate::key::RasterKey;
use crate::store::DurableRasterStore;

/// Everything needed to persist one rendered frame.
pub struct PersistJob {
    pub key: RasterKey,
    pub preview_png: Bytes,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<f32>,
}

/// Submission handle for the background persistence worker.
pub struct PersistQueue {
    tx: mpsc::Sender<PersistJob>,
}

impl PersistQueue {
    /// Spawn the worker loop. `queue_depth` bounds pending jobs;
    /// `max_concurrency` bounds in-flight uploads.
    pub fn start(
        store: Arc<dyn DurableRasterStore>,
        queue_depth: usize,
        max_concurrency: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<PersistJob>(queue_depth.max(1));

        tokio::spawn(async move {
            let limit = Arc::new(Semaphore::new(max_concurrency.max(1)));
            while let Some(job) = rx.recv().await {
                let Ok(permit) = limit.clone().acquire_owned().await else {
                    break;
                };
                let store = store.clone();
                tokio::spawn(async move {
                    let stem = job.key.filename_stem();
                    match persist_one(store.as_ref(), job).await {
                        Ok(()) => debug!(key = %stem, "raster artifacts persisted"),
                        Err(error) => {
                            warn!(key = %stem, error = %error, "background raster persist failed")
                        }
                    }
                    drop(permit);
                });
            }
        });

        Self { tx }
    }

    /// Fire-and-forget submission. A full queue drops the job: the caller
    /// already has its preview, and the next request for the key will
    /// simply render again.
    pub fn submit(&self, job: PersistJob) {
        let stem = job.key.filename_stem();
        if self.tx.try_send(job).is_err() {
            warn!(key = %stem, "persist queue full, dropping job");
        }
    }
}

async fn persist_one(store: &dyn DurableRasterStore, job: PersistJob) -> RadarResult<()> {
    let export = renderer::geotiff::encode_gray32(&job.lats, &job.lons, &job.values)?;

    // Export first; the preview row is what lookups key off, so by the
    // time it lands both objects are in place.
    let export_name = job.key.filename(".tif");
    store
        .upload(&export_name, Bytes::from(export), "image/tiff")
        .await?;
    store
        .upsert_metadata(&job.key, &export_name, "image/tiff")
        .await?;

    let preview_name = job.key.filename(".png");
    store
        .upload(&preview_name, job.preview_png.clone(), "image/png")
        .await?;
    store
        .upsert_metadata(&job.key, &preview_name, "image/png")
        .await?;

    Ok(())
}
