mod request;
mod update;

pub use request::{
    AnswerCallbackQueryRequest, DeleteWebhookRequest, GetUpdatesRequest, InlineKeyboardButton,
    InlineKeyboardMarkup, SendMessageRequest, SetWebhookRequest,
};
pub use update::{CallbackQuery, Chat, Message, TelegramResponse, Update};
