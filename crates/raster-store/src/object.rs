//! Object storage wrapper for raster artifacts (MinIO/S3 compatible).

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use std::sync::Arc;
use tracing::{debug, instrument};

use radar_common::{RadarError, RadarResult};

use crate::config::RasterStoreConfig;

/// Artifact bucket client.
pub struct ArtifactBucket {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base: String,
}

impl ArtifactBucket {
    /// Create a bucket client from config.
    pub fn new(config: &RasterStoreConfig) -> RadarResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            RadarError::persistence_failure(format!("failed to create S3 client: {}", e))
        })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
            public_base: config.public_base().trim_end_matches('/').to_string(),
        })
    }

    /// Write an artifact. Overwrites are idempotent: the same key always
    /// produces the same filename and content.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, filename = %filename))]
    pub async fn put(&self, filename: &str, data: Bytes) -> RadarResult<()> {
        let location = Path::from(filename);
        debug!(size = data.len(), "writing artifact");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| {
                RadarError::persistence_failure(format!("failed to write {}: {}", filename, e))
            })?;

        Ok(())
    }

    /// Check if an artifact exists.
    pub async fn exists(&self, filename: &str) -> RadarResult<bool> {
        let location = Path::from(filename);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(RadarError::persistence_failure(format!(
                "failed to check {}: {}",
                filename, e
            ))),
        }
    }

    /// Public URL for an artifact filename.
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_layout() {
        let config = RasterStoreConfig {
            endpoint: "http://minio:9000".to_string(),
            public_url_base: Some("https://cdn.example.org/".to_string()),
            ..RasterStoreConfig::default()
        };
        let bucket = ArtifactBucket::new(&config).unwrap();

        assert_eq!(
            bucket.public_url("20261011_1200_precipitation_ab12cd34.png"),
            "https://cdn.example.org/radar-cache/20261011_1200_precipitation_ab12cd34.png"
        );
    }
}
