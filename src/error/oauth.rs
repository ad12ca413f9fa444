use super::IsRetryable;
use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum OauthError {
    #[error("Service account key decode error: {0}")]
    KeyDecode(String),

    #[error("Service account key parse error: {0}")]
    KeyParse(#[from] serde_json::Error),

    #[error("JWT assertion signing error: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    #[error("OAuth2 request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OAuth2 upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("OAuth2 server response error: {error}")]
    ServerResponse { error: String },

    #[error("OAuth2 token endpoint parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },
}

impl OauthError {
    /// Build a `Parse` error, keeping at most 100 characters of the body.
    pub(crate) fn parse(message: impl ToString, body: &[u8]) -> Self {
        let body_str = String::from_utf8_lossy(body);
        let body = body_str
            .char_indices()
            .nth(100)
            .map(|(idx, _)| format!("{}...<truncated>", &body_str[..idx]))
            .unwrap_or_else(|| body_str.into_owned());
        OauthError::Parse {
            message: message.to_string(),
            body,
        }
    }
}

impl IsRetryable for OauthError {
    fn is_retryable(&self) -> bool {
        match self {
            OauthError::Request(_) => true,
            OauthError::UpstreamStatus(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}
