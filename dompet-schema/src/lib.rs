pub mod sheets;
pub mod telegram;

pub use sheets::{ClearValuesResponse, UpdateValuesResponse, ValueRange};
pub use telegram::{
    AnswerCallbackQueryRequest, CallbackQuery, Chat, DeleteWebhookRequest, GetUpdatesRequest,
    InlineKeyboardButton, InlineKeyboardMarkup, Message, SendMessageRequest, SetWebhookRequest,
    TelegramResponse, Update,
};
