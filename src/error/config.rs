use thiserror::Error as ThisError;

/// Startup configuration failures. Always fatal.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),
}
