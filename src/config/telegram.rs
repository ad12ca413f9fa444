use super::basic::{deserialize_opt_string_lax, deserialize_string_lax};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

pub static DEFAULT_TELEGRAM_API_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.telegram.org/").expect("valid default telegram api url")
});

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot API token.
    /// TOML: `telegram.bot_token`. Env: `BOT_TOKEN`. Required.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub bot_token: String,

    /// TOML: `telegram.mode`. Env: `MODE`. Default: `polling`.
    #[serde(default)]
    pub mode: TransportMode,

    /// Public URL Telegram posts updates to. Required in webhook mode.
    /// TOML: `telegram.webhook_url`. Env: `WEBHOOK_URL`.
    #[serde(default)]
    pub webhook_url: Option<Url>,

    /// Value Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    /// TOML: `telegram.webhook_secret`. Optional.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub webhook_secret: Option<String>,

    /// TOML: `telegram.api_url`. Default: `https://api.telegram.org/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Long-poll timeout passed to `getUpdates`.
    /// TOML: `telegram.poll_timeout_secs`. Default: `60`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Outbound message budget.
    /// TOML: `telegram.send_rate_per_sec`. Default: `25`.
    #[serde(default = "default_send_rate_per_sec")]
    pub send_rate_per_sec: u32,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            mode: TransportMode::default(),
            webhook_url: None,
            webhook_secret: None,
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            send_rate_per_sec: default_send_rate_per_sec(),
        }
    }
}

fn default_api_url() -> Url {
    DEFAULT_TELEGRAM_API_URL.clone()
}

fn default_poll_timeout_secs() -> u64 {
    60
}

fn default_send_rate_per_sec() -> u32 {
    25
}
