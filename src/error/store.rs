use super::IsRetryable;
use super::oauth::OauthError;
use crate::ledger::Position;
use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failure talking to the ledger or preference backend.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ledger has no entries")]
    EmptyLedger,

    #[error("Storage call timed out")]
    Timeout,

    #[error(transparent)]
    Auth(#[from] OauthError),

    #[error("Ractor error: {0}")]
    Ractor(String),
}

impl IsRetryable for StoreError {
    fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(_) | StoreError::Timeout => true,
            StoreError::UpstreamStatus(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            StoreError::Auth(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result of looking up a single ledger row.
#[derive(Debug, ThisError)]
pub enum LedgerError {
    #[error("Ledger entry #{0} not found")]
    NotFound(Position),

    #[error(transparent)]
    Store(#[from] StoreError),
}
