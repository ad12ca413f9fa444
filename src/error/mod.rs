mod config;
mod dompet;
mod oauth;
mod store;
mod transport;

pub use config::ConfigError;
pub use dompet::DompetError;
pub use oauth::OauthError;
pub use store::{LedgerError, StoreError};
pub use transport::TransportError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
