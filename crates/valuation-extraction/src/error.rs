use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("required sub-record absent from source document: {0}")]
    InsufficientSourceData(String),

    #[error("extractor model output invalid after retries: {0}")]
    ExtractionFailed(String),
}
