use super::dispatch::{UpdateDispatcher, inbound_from_update};
use crate::server::access_log::{Delivery, access_log};
use crate::server::guards::secret::RequireWebhookSecret;
use axum::{
    Extension, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use dompet_schema::Update;
use std::sync::Arc;
use tracing::warn;

pub const WEBHOOK_PATH: &str = "/webhook";

#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: UpdateDispatcher,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`; `None` accepts any caller.
    pub secret: Option<Arc<str>>,
}

impl WebhookState {
    pub fn new(dispatcher: UpdateDispatcher, secret: Option<&str>) -> Self {
        Self {
            dispatcher,
            secret: secret.map(Arc::from),
        }
    }
}

// Always 200: a non-2xx makes Telegram redeliver the same update.
async fn receive_update(
    State(state): State<WebhookState>,
    body: Bytes,
) -> (StatusCode, Extension<Delivery>) {
    let delivery = match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            let delivery = Delivery::Dispatched {
                update_id: update.update_id,
                chat_id: inbound_from_update(&update).map(|inbound| inbound.chat_id()),
            };
            state.dispatcher.dispatch(update).await;
            delivery
        }
        Err(e) => {
            warn!(error = %e, "Error decoding update");
            Delivery::Undecodable
        }
    };
    (StatusCode::OK, Extension(delivery))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn webhook_router(state: WebhookState) -> Router {
    let hook = Router::new()
        .route(WEBHOOK_PATH, post(receive_update))
        .layer(middleware::from_extractor_with_state::<RequireWebhookSecret, _>(
            state.clone(),
        ));

    Router::new()
        .merge(hook)
        .route("/healthz", get(healthz))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
