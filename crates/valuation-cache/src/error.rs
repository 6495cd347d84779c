use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("payload (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
