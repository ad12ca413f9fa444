//! The chat-side seam: what the router receives and what it sends back.

use crate::error::TransportError;
use async_trait::async_trait;
use dompet_schema::InlineKeyboardMarkup;

/// Opaque chat identity.
pub type ChatId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Free text or a `/command`.
    Message { chat_id: ChatId, text: String },
    /// An inline-button selection carrying its callback token.
    Choice { chat_id: ChatId, token: String },
}

impl Inbound {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Inbound::Message { chat_id, .. } | Inbound::Choice { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError>;
}
