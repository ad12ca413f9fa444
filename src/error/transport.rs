use super::IsRetryable;
use thiserror::Error as ThisError;

/// Failure calling the Telegram Bot API.
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Telegram call timed out")]
    Timeout,
}

impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) | TransportError::Timeout => true,
            TransportError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
