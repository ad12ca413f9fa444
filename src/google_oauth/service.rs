use super::credentials::{AccessToken, ServiceAccountKey};
use super::endpoints::{GoogleOauthEndpoints, SHEETS_SCOPE};
use crate::error::OauthError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

/// Source of bearer tokens for Google API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, OauthError>;
}

/// Mints tokens with a service-account key and caches them until shortly
/// before expiry. Concurrent callers share one exchange.
pub struct ServiceAccountTokenSource {
    http: reqwest::Client,
    key: ServiceAccountKey,
    token_url: Url,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey, token_url: Url) -> Self {
        Self {
            http,
            key,
            token_url,
            scope: SHEETS_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, OauthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let token =
            GoogleOauthEndpoints::exchange_jwt(&self.key, &self.token_url, &self.scope, &self.http)
                .await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

/// A fixed token, for local runs against emulators and for tests.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, OauthError> {
        Ok(self.0.clone())
    }
}
