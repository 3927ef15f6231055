//! Batched point-data client for an Open-Meteo-style provider.
//!
//! The provider prices by coordinate pair and accepts whole batches in one
//! request, so the grid's points are flattened into comma-separated
//! latitude/longitude lists. Retry with exponential backoff and a short-TTL
//! response cache live here, at the transport boundary; shape validation of
//! the returned batch happens before anything reaches the assembler.

use async_trait::async_trait;
use bytes::Bytes;
use grid_engine::{PointSeries, SampleGrid};
use radar_common::{RadarError, RadarResult, TimeRange, Variable};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::response_cache::ResponseCache;
use crate::wire;
use crate::PointDataProvider;

/// Configuration for the point-data client.
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    /// Forecast endpoint (also covers the recent past).
    pub forecast_url: String,
    /// Archive endpoint for deeper history.
    pub archive_url: String,
    /// Model selector; "best_match" picks the densest model per region.
    pub model: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Maximum retry attempts after the first try.
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry).
    pub initial_retry_delay: Duration,
    /// Maximum retry delay.
    pub max_retry_delay: Duration,
    /// TTL for the transport-level response cache.
    pub cache_ttl: Duration,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            model: "best_match".to_string(),
            request_timeout: Duration::from_secs(60),
            max_retries: 5,
            initial_retry_delay: Duration::from_millis(200),
            max_retry_delay: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Point-data provider backed by a batched HTTP endpoint.
pub struct OpenMeteoProvider {
    client: Client,
    config: OpenMeteoConfig,
    cache: ResponseCache,
}

impl OpenMeteoProvider {
    pub fn new(config: OpenMeteoConfig) -> RadarResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                RadarError::provider_unavailable(format!("failed to create HTTP client: {}", e))
            })?;

        let cache = ResponseCache::new(config.cache_ttl);
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    #[instrument(skip(self, grid, variables), fields(points = grid.len()))]
    async fn fetch(
        &self,
        endpoint: &str,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>> {
        if grid.is_empty() {
            return Err(RadarError::invalid_region("empty sample grid"));
        }
        if variables.is_empty() {
            return Err(RadarError::provider_unavailable("no variables requested"));
        }

        let params = build_params(grid, window, variables, &self.config.model);
        let cache_key = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let cache_key = format!("{}?{}", endpoint, cache_key);

        let body = match self.cache.get(&cache_key).await {
            Some(body) => {
                debug!("transport cache hit");
                body
            }
            None => {
                let body = self.request_with_retry(endpoint, &params).await?;
                self.cache.put(cache_key, body.clone()).await;
                body
            }
        };

        let batch = wire::parse_batch(&body)?;
        if batch.len() != grid.len() {
            return Err(RadarError::IncompletePointSet {
                requested: grid.len(),
                returned: batch.len(),
            });
        }

        let mut series = Vec::with_capacity(batch.len());
        for response in batch {
            series.push(response.into_point_series(variables)?);
        }

        // The shared-axis guarantee the assembler depends on.
        let axis = series[0].axis;
        if let Some(idx) = series.iter().position(|p| p.axis != axis) {
            return Err(RadarError::inconsistent_time_axis(format!(
                "point {} returned a different time axis than the batch",
                idx
            )));
        }

        Ok(series)
    }

    async fn request_with_retry(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> RadarResult<Bytes> {
        let mut delay = self.config.initial_retry_delay;

        for attempt in 0..=self.config.max_retries {
            let result = self
                .client
                .get(endpoint)
                .query(params)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(response) => {
                    return response.bytes().await.map_err(|e| {
                        RadarError::provider_unavailable(format!("failed to read body: {}", e))
                    });
                }
                Err(err) if attempt < self.config.max_retries => {
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "provider request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_retry_delay);
                }
                Err(err) => {
                    return Err(RadarError::provider_unavailable(format!(
                        "request failed after {} attempts: {}",
                        self.config.max_retries + 1,
                        err
                    )));
                }
            }
        }

        unreachable!("retry loop returns on final attempt")
    }
}

fn build_params(
    grid: &SampleGrid,
    window: &TimeRange,
    variables: &[Variable],
    model: &str,
) -> Vec<(&'static str, String)> {
    let mut lat_list = String::new();
    let mut lon_list = String::new();
    for (lat, lon) in grid.points() {
        if !lat_list.is_empty() {
            lat_list.push(',');
            lon_list.push(',');
        }
        lat_list.push_str(&format!("{:.6}", lat));
        lon_list.push_str(&format!("{:.6}", lon));
    }

    let hourly = variables
        .iter()
        .map(|v| v.provider_name())
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("latitude", lat_list),
        ("longitude", lon_list),
        ("hourly", hourly),
        ("start_date", window.start.format("%Y-%m-%d").to_string()),
        ("end_date", window.end.format("%Y-%m-%d").to_string()),
        ("models", model.to_string()),
    ]
}

#[async_trait]
impl PointDataProvider for OpenMeteoProvider {
    async fn fetch_forecast(
        &self,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>> {
        self.fetch(self.config.forecast_url.as_str(), grid, window, variables)
            .await
    }

    async fn fetch_history(
        &self,
        grid: &SampleGrid,
        window: &TimeRange,
        variables: &[Variable],
    ) -> RadarResult<Vec<PointSeries>> {
        self.fetch(self.config.archive_url.as_str(), grid, window, variables)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_common::time::parse_utc;
    use radar_common::BoundingBox;

    #[test]
    fn test_build_params_row_major_order() {
        let bbox = BoundingBox::new(40.0, 41.0, -4.0, -3.0).unwrap();
        let grid = grid_engine::GridPlanner::plan(&bbox, 4, 0.01).unwrap();
        let window = TimeRange::new(
            parse_utc("2026-08-01").unwrap(),
            parse_utc("2026-08-03").unwrap(),
        )
        .unwrap();

        let params = build_params(
            &grid,
            &window,
            &[Variable::Precipitation, Variable::CloudCover],
            "best_match",
        );

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        // 2x2 grid: latitude repeats per row, longitude cycles within it.
        assert_eq!(get("latitude"), "40.000000,40.000000,40.500000,40.500000");
        assert_eq!(
            get("longitude"),
            "-4.000000,-3.500000,-4.000000,-3.500000"
        );
        assert_eq!(get("hourly"), "precipitation,cloud_cover");
        assert_eq!(get("start_date"), "2026-08-01");
        assert_eq!(get("models"), "best_match");
    }
}
