use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalystError {
    #[error("analyst model output invalid after retries: {0}")]
    AnalysisFailed(String),
}
