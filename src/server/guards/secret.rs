use crate::telegram::WebhookState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderName, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use subtle::ConstantTimeEq;

pub const SECRET_TOKEN_HEADER: HeaderName =
    HeaderName::from_static("x-telegram-bot-api-secret-token");

/// Rejects webhook calls whose secret header does not match the configured
/// secret. Passes everything when no secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct RequireWebhookSecret;

impl FromRequestParts<WebhookState> for RequireWebhookSecret {
    type Rejection = SecretError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WebhookState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.secret.as_deref() else {
            return Ok(RequireWebhookSecret);
        };

        match parts
            .headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
                Ok(RequireWebhookSecret)
            }
            Some(_) => Err(SecretError::InvalidSecret),
            None => Err(SecretError::MissingSecret),
        }
    }
}

pub enum SecretError {
    MissingSecret,
    InvalidSecret,
}

impl IntoResponse for SecretError {
    fn into_response(self) -> Response {
        let reason = match self {
            SecretError::MissingSecret => "Missing secret token",
            SecretError::InvalidSecret => "Invalid secret token",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}
