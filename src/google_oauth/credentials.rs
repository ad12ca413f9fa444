use crate::error::OauthError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// The fields of a Google service-account JSON key this bot needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .field("private_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Decodes the base64-wrapped JSON key used in deployment settings.
    pub fn from_base64(encoded: &str) -> Result<Self, OauthError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| OauthError::KeyDecode(e.to_string()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, OauthError> {
        let key: Self = serde_json::from_slice(raw)?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(OauthError::KeyDecode(
                "client_email and private_key must be present".to_string(),
            ));
        }
        Ok(key)
    }
}

/// A bearer token and when it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl AccessToken {
    /// True within 5 minutes of expiry (inclusive).
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::minutes(5) >= self.expiry
    }
}
