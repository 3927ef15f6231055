//! Durable raster store: object bucket + metadata table behind one trait.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::instrument;

use radar_common::RadarResult;

use crate::catalog::{ArtifactRecord, RasterCatalog};
use crate::config::RasterStoreConfig;
use crate::key::RasterKey;
use crate::object::ArtifactBucket;

/// Operations the cache needs from durable storage.
///
/// The trait seam keeps `RasterCache` testable without a live bucket or
/// database; `RemoteRasterStore` is the production implementation.
#[async_trait]
pub trait DurableRasterStore: Send + Sync {
    /// Look up the stored preview URL for a key, if any.
    async fn lookup_preview(&self, key: &RasterKey) -> RadarResult<Option<String>>;

    /// Upload artifact bytes under a filename; returns the public URL.
    /// Uploads are idempotent overwrites keyed by filename.
    async fn upload(&self, filename: &str, bytes: Bytes, content_type: &str) -> RadarResult<String>;

    /// Register an uploaded artifact in the metadata table.
    async fn upsert_metadata(
        &self,
        key: &RasterKey,
        filename: &str,
        content_type: &str,
    ) -> RadarResult<()>;

    /// Public URL an artifact filename will resolve to once uploaded.
    fn public_url(&self, filename: &str) -> String;
}

/// Production store: S3-compatible bucket plus a Postgres metadata table.
pub struct RemoteRasterStore {
    bucket: ArtifactBucket,
    catalog: RasterCatalog,
}

impl RemoteRasterStore {
    /// Connect to both backends and ensure the schema exists.
    pub async fn connect(config: &RasterStoreConfig) -> RadarResult<Self> {
        let bucket = ArtifactBucket::new(config)?;
        let catalog = RasterCatalog::connect(&config.database_url).await?;
        catalog.migrate().await?;
        Ok(Self { bucket, catalog })
    }
}

#[async_trait]
impl DurableRasterStore for RemoteRasterStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn lookup_preview(&self, key: &RasterKey) -> RadarResult<Option<String>> {
        let filename = self
            .catalog
            .find(
                &key.region_hash(),
                key.variable.name(),
                key.timestamp,
                "image/png",
            )
            .await?;

        Ok(filename.map(|name| self.bucket.public_url(&name)))
    }

    async fn upload(
        &self,
        filename: &str,
        bytes: Bytes,
        // Content type travels in the metadata row; the bucket stores raw
        // bytes under the deterministic filename.
        _content_type: &str,
    ) -> RadarResult<String> {
        self.bucket.put(filename, bytes).await?;
        Ok(self.bucket.public_url(filename))
    }

    async fn upsert_metadata(
        &self,
        key: &RasterKey,
        filename: &str,
        content_type: &str,
    ) -> RadarResult<()> {
        self.catalog
            .upsert(&ArtifactRecord {
                filename: filename.to_string(),
                variable: key.variable.name().to_string(),
                timestamp: key.timestamp,
                region_hash: key.region_hash(),
                content_type: content_type.to_string(),
            })
            .await
    }

    fn public_url(&self, filename: &str) -> String {
        self.bucket.public_url(filename)
    }
}
