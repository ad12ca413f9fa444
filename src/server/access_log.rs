use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Outcome of a webhook delivery, attached to the response by the handler so
/// the access line can name the update it carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Dispatched {
        update_id: i64,
        chat_id: Option<i64>,
    },
    Undecodable,
}

impl Delivery {
    fn describe(self) -> String {
        match self {
            Delivery::Dispatched {
                update_id,
                chat_id: Some(chat_id),
            } => format!("update={update_id} chat={chat_id}"),
            Delivery::Dispatched {
                update_id,
                chat_id: None,
            } => format!("update={update_id} ignored"),
            Delivery::Undecodable => "undecodable update".to_string(),
        }
    }
}

fn generate_request_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn request_id_of(req: &Request) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string)
}

/// One line per request. Webhook deliveries carry their update and chat id;
/// an undecodable update is logged as a warning even though it answers 200.
pub async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = request_id_of(&req);

    let start = Instant::now();
    let mut resp = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let delivery = resp.extensions().get::<Delivery>().copied();
    let detail = delivery.map_or_else(|| "-".to_string(), Delivery::describe);
    let line = format!(
        "| {:>3} | {request_id} | {:^6} | {path} | {latency_ms}ms | {detail}",
        status.as_u16(),
        method.as_str(),
    );

    if status.is_server_error() {
        error!("{line}");
    } else if status.is_client_error() || delivery == Some(Delivery::Undecodable) {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}
