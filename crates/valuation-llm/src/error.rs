use thiserror::Error;

/// Outcome of one completion attempt, ahead of any retry policy the caller
/// applies (spec §9, "Abstracting the LLM").
#[derive(Debug, Error)]
pub enum LlmError {
    /// The model returned text that does not parse as the expected schema.
    /// Carries the parser's complaint so the caller can feed it back as
    /// retry context.
    #[error("model output did not conform to schema: {0}")]
    SchemaError(String),

    /// Network failure or a 5xx from the upstream service. The caller is
    /// expected to retry with backoff before giving up.
    #[error("transient upstream failure: {0}")]
    TransientError(String),

    /// Anything else: 4xx other than rate-limiting, malformed credentials,
    /// an upstream that will not succeed on retry.
    #[error("permanent upstream failure: {0}")]
    PermanentError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            LlmError::TransientError(err.to_string())
        } else if let Some(status) = err.status() {
            if status.is_server_side_error() || status.as_u16() == 429 {
                LlmError::TransientError(err.to_string())
            } else {
                LlmError::PermanentError(err.to_string())
            }
        } else {
            LlmError::TransientError(err.to_string())
        }
    }
}
