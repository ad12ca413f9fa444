//! Google service-account authentication for the Sheets backend.

pub mod credentials;
pub mod endpoints;
pub mod service;

pub use credentials::{AccessToken, ServiceAccountKey};
pub use endpoints::{GoogleOauthEndpoints, SHEETS_SCOPE};
pub use service::{AccessTokenProvider, ServiceAccountTokenSource, StaticToken};
