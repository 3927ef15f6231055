//! Metadata table for cached raster artifacts (PostgreSQL).

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use radar_common::{RadarError, RadarResult};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS raster_artifacts (
    filename TEXT PRIMARY KEY,
    variable TEXT NOT NULL,
    ts TIMESTAMPTZ NOT NULL,
    region_hash TEXT NOT NULL,
    content_type TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS raster_artifacts_lookup
    ON raster_artifacts (region_hash, variable, ts)
"#;

/// One artifact row. Rows are only ever inserted or upserted; the content
/// behind a filename is deterministic, so last-writer-wins is safe.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub filename: String,
    pub variable: String,
    pub timestamp: DateTime<Utc>,
    pub region_hash: String,
    pub content_type: String,
}

/// Catalog over the artifact metadata table.
pub struct RasterCatalog {
    pool: PgPool,
}

impl RasterCatalog {
    /// Connect to the metadata database.
    pub async fn connect(database_url: &str) -> RadarResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| {
                RadarError::persistence_failure(format!("database connection failed: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Create the schema if missing.
    pub async fn migrate(&self) -> RadarResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(&self.pool).await.map_err(|e| {
                    RadarError::persistence_failure(format!("migration failed: {}", e))
                })?;
            }
        }
        Ok(())
    }

    /// Insert or refresh an artifact row.
    pub async fn upsert(&self, record: &ArtifactRecord) -> RadarResult<()> {
        sqlx::query(
            r#"
            INSERT INTO raster_artifacts (
                filename, variable, ts, region_hash, content_type, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (filename)
            DO UPDATE SET
                variable = EXCLUDED.variable,
                ts = EXCLUDED.ts,
                region_hash = EXCLUDED.region_hash,
                content_type = EXCLUDED.content_type,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&record.filename)
        .bind(&record.variable)
        .bind(record.timestamp)
        .bind(&record.region_hash)
        .bind(&record.content_type)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RadarError::persistence_failure(format!("upsert failed: {}", e)))?;

        Ok(())
    }

    /// Find a cached artifact's filename for a (region, variable, time)
    /// triple and content type.
    pub async fn find(
        &self,
        region_hash: &str,
        variable: &str,
        timestamp: DateTime<Utc>,
        content_type: &str,
    ) -> RadarResult<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT filename FROM raster_artifacts
            WHERE region_hash = $1 AND variable = $2 AND ts = $3 AND content_type = $4
            LIMIT 1
            "#,
        )
        .bind(region_hash)
        .bind(variable)
        .bind(timestamp)
        .bind(content_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RadarError::persistence_failure(format!("lookup failed: {}", e)))?;

        Ok(row.map(|r| r.get("filename")))
    }
}
