//! On-disk persistence for the Cache Manager. SQLite rather than the
//! teacher's Redis, because the core must survive a process restart with
//! no network service running (spec §4.8, §6 `CACHE_DIR`).

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use valuation_types::{CacheEntry, CacheStage};

use crate::error::CacheError;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    fingerprint TEXT PRIMARY KEY,
    stage       TEXT NOT NULL,
    payload     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    ttl_secs    INTEGER NOT NULL
)
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query("SELECT fingerprint, stage, payload, created_at, ttl_secs FROM cache_entries WHERE fingerprint = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_entry).transpose()
    }

    pub async fn set(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let payload = serde_json::to_string(&entry.payload)?;
        sqlx::query(
            "INSERT INTO cache_entries (fingerprint, stage, payload, created_at, ttl_secs)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(fingerprint) DO UPDATE SET
               stage = excluded.stage,
               payload = excluded.payload,
               created_at = excluded.created_at,
               ttl_secs = excluded.ttl_secs",
        )
        .bind(&entry.fingerprint)
        .bind(entry.stage.as_str())
        .bind(payload)
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.ttl_secs)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE fingerprint = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }
}

fn row_to_entry(row: SqliteRow) -> Result<CacheEntry, CacheError> {
    let payload_text: String = row.try_get("payload")?;
    let stage_text: String = row.try_get("stage")?;
    let created_at_text: String = row.try_get("created_at")?;

    Ok(CacheEntry {
        fingerprint: row.try_get("fingerprint")?,
        stage: parse_stage(&stage_text),
        payload: serde_json::from_str(&payload_text)?,
        created_at: parse_timestamp(&created_at_text),
        ttl_secs: row.try_get("ttl_secs")?,
    })
}

fn parse_stage(s: &str) -> CacheStage {
    match s {
        "extraction" => CacheStage::Extraction,
        "valuation" => CacheStage::Valuation,
        "analysis" => CacheStage::Analysis,
        _ => CacheStage::Price,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
