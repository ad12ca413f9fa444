use super::credentials::{AccessToken, ServiceAccountKey};
use crate::error::OauthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Stateless service-account token endpoint calls.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Signs the RS256 assertion for the JWT-bearer grant.
    pub fn sign_assertion(
        key: &ServiceAccountKey,
        token_url: &Url,
        scope: &str,
    ) -> Result<String, OauthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: key.client_email.clone(),
            scope: scope.to_string(),
            aud: token_url.to_string(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&key.private_key_id);
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
    }

    /// Exchanges a signed assertion for an access token.
    pub async fn exchange_jwt(
        key: &ServiceAccountKey,
        token_url: &Url,
        scope: &str,
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, OauthError> {
        let assertion = Self::sign_assertion(key, token_url, scope)?;
        let resp = http_client
            .post(token_url.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            debug!(%status, "Token endpoint rejected the assertion");
            return Err(match serde_json::from_slice::<TokenErrorResponse>(&body) {
                Ok(err) => OauthError::ServerResponse {
                    error: err
                        .error_description
                        .map_or_else(|| err.error.clone(), |d| format!("{}: {d}", err.error)),
                },
                Err(_) => OauthError::UpstreamStatus(status),
            });
        }

        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| OauthError::parse(e, &body))?;
        let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        info!(
            client_email = %key.client_email,
            expires_in,
            "Service account access token obtained"
        );
        Ok(AccessToken {
            token: token.access_token,
            expiry: Utc::now() + Duration::seconds(expires_in),
        })
    }
}
