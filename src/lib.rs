pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod google_oauth;
pub mod ledger;
pub mod nominal;
pub mod reminder;
pub mod server;
pub mod sheets;
pub mod summary;
pub mod telegram;
pub mod transport;

pub use config::Config;
pub use error::DompetError;
