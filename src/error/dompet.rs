use super::{ConfigError, OauthError, StoreError, TransportError};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DompetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ractor error: {0}")]
    Ractor(String),
}
