use super::client::TelegramClient;
use crate::conversation::ConversationRouter;
use crate::transport::{ChatTransport, Inbound};
use dompet_schema::Update;
use tracing::{Level, debug, error, enabled, trace, warn};

/// Maps an update onto the router's input. Text messages and button presses
/// are the only updates the bot acts on.
pub fn inbound_from_update(update: &Update) -> Option<Inbound> {
    if let Some(query) = &update.callback_query {
        let chat_id = query.message.as_ref()?.chat.id;
        let token = query.data.clone()?;
        return Some(Inbound::Choice { chat_id, token });
    }
    let message = update.message.as_ref()?;
    let text = message.text.clone()?;
    Some(Inbound::Message {
        chat_id: message.chat.id,
        text,
    })
}

fn update_kind(update: &Update) -> &'static str {
    if update.callback_query.is_some() {
        "callback_query"
    } else if update.message.is_some() {
        "message"
    } else {
        "other"
    }
}

/// Debug line per update; the full payload only at trace level.
fn log_update(update: &Update) {
    debug!(update_id = update.update_id, kind = update_kind(update), "Update received");
    if enabled!(Level::TRACE) {
        let payload = serde_json::to_string_pretty(update)
            .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
        trace!("Update payload: {payload}");
    }
}

/// Runs one update through the router and delivers the reply.
#[derive(Clone)]
pub struct UpdateDispatcher {
    router: ConversationRouter,
    client: TelegramClient,
}

impl UpdateDispatcher {
    pub fn new(router: ConversationRouter, client: TelegramClient) -> Self {
        Self { router, client }
    }

    pub async fn dispatch(&self, update: Update) {
        log_update(&update);

        if let Some(query) = &update.callback_query
            && let Err(e) = self.client.answer_callback_query(&query.id).await
        {
            warn!(update_id = update.update_id, error = %e, "answerCallbackQuery failed");
        }

        let Some(inbound) = inbound_from_update(&update) else {
            debug!(update_id = update.update_id, "Ignoring update");
            return;
        };
        let chat_id = inbound.chat_id();
        let Some(reply) = self.router.handle(inbound).await else {
            return;
        };
        if let Err(e) = self.client.send(chat_id, &reply).await {
            error!(chat_id, error = %e, "Reply delivery failed");
        }
    }
}
