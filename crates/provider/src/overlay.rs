//! Read-only client for the official national radar composite.
//!
//! The open-data API answers with a small JSON envelope whose `datos` field
//! points at the actual image resource; the image itself is overlaid on the
//! map with a fixed display bounding box. This collaborator sits outside
//! the grid pipeline entirely.

use radar_common::{BoundingBox, RadarError, RadarResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://opendata.aemet.es/opendata/api";

#[derive(Debug, Deserialize)]
struct Envelope {
    estado: i64,
    datos: Option<String>,
    descripcion: Option<String>,
}

pub struct RadarOverlayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RadarOverlayClient {
    pub fn new(api_key: impl Into<String>) -> RadarResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> RadarResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                RadarError::provider_unavailable(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// URL of the current national reflectivity composite image.
    pub async fn composite_url(&self) -> RadarResult<String> {
        let endpoint = format!("{}/red/radar/nacional/composicion", self.base_url);

        let envelope: Envelope = self
            .client
            .get(&endpoint)
            .header("api_key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RadarError::provider_unavailable(format!("radar composite: {}", e)))?
            .json()
            .await
            .map_err(|e| RadarError::provider_unavailable(format!("radar composite: {}", e)))?;

        match (envelope.estado, envelope.datos) {
            (200, Some(url)) => Ok(url),
            (estado, _) => {
                let detail = envelope
                    .descripcion
                    .unwrap_or_else(|| "no description".to_string());
                warn!(estado, detail = %detail, "radar composite unavailable");
                Err(RadarError::provider_unavailable(format!(
                    "radar composite returned estado {}: {}",
                    estado, detail
                )))
            }
        }
    }

    /// Fixed display bounds for the national composite overlay.
    ///
    /// Wider than the peninsular frame on purpose so the image never ends
    /// up cropped against the basemap.
    pub fn national_bounds(&self) -> BoundingBox {
        BoundingBox {
            min_lat: 34.0,
            max_lat: 45.0,
            min_lon: -15.0,
            max_lon: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_bounds_cover_peninsula() {
        let client = RadarOverlayClient::new("test-key").unwrap();
        let bounds = client.national_bounds();
        // Madrid and the Balearics both fall inside the display frame.
        assert!(bounds.contains(40.4, -3.7));
        assert!(bounds.contains(39.6, 2.9));
    }

    #[test]
    fn test_envelope_parsing() {
        let ok: Envelope = serde_json::from_str(
            r#"{"estado": 200, "datos": "https://example.org/radar.png"}"#,
        )
        .unwrap();
        assert_eq!(ok.estado, 200);
        assert_eq!(ok.datos.as_deref(), Some("https://example.org/radar.png"));

        let err: Envelope =
            serde_json::from_str(r#"{"estado": 401, "descripcion": "api key invalido"}"#).unwrap();
        assert_eq!(err.estado, 401);
        assert!(err.datos.is_none());
    }
}
