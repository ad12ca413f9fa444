//! Telegram Bot API transport: client, update dispatch, polling and webhook.

mod client;
mod dispatch;
mod polling;
mod webhook;

pub use client::{ALLOWED_UPDATES, TelegramClient};
pub use dispatch::{UpdateDispatcher, inbound_from_update};
pub use polling::run_polling;
pub use webhook::{WEBHOOK_PATH, WebhookState, webhook_router};
