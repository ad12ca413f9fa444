use super::basic::deserialize_string_lax;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

pub static DEFAULT_SHEETS_API_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://sheets.googleapis.com/v4/spreadsheets/")
        .expect("valid default sheets api url")
});

pub static DEFAULT_TOKEN_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://oauth2.googleapis.com/token").expect("valid default token url")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sheets,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// TOML: `storage.backend`. Default: `sheets`.
    #[serde(default)]
    pub backend: StorageBackend,

    /// TOML: `storage.spreadsheet_id`. Env: `SPREADSHEET_ID`. Required for sheets.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub spreadsheet_id: String,

    /// Base64 of the service-account JSON key.
    /// TOML: `storage.credentials_base64`. Env: `GOOGLE_CREDENTIALS_BASE64`. Required for sheets.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub credentials_base64: String,

    /// Sheet holding the ledger; empty means the spreadsheet's first sheet.
    /// TOML: `storage.ledger_sheet`. Default: empty.
    #[serde(default)]
    pub ledger_sheet: String,

    /// TOML: `storage.preferences_sheet`. Default: `Preferences`.
    #[serde(default = "default_preferences_sheet")]
    pub preferences_sheet: String,

    /// TOML: `storage.sheets_api_url`.
    #[serde(default = "default_sheets_api_url")]
    pub sheets_api_url: Url,

    /// TOML: `storage.token_url`.
    #[serde(default = "default_token_url")]
    pub token_url: Url,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            spreadsheet_id: String::new(),
            credentials_base64: String::new(),
            ledger_sheet: String::new(),
            preferences_sheet: default_preferences_sheet(),
            sheets_api_url: default_sheets_api_url(),
            token_url: default_token_url(),
        }
    }
}

fn default_preferences_sheet() -> String {
    "Preferences".to_string()
}

fn default_sheets_api_url() -> Url {
    DEFAULT_SHEETS_API_URL.clone()
}

fn default_token_url() -> Url {
    DEFAULT_TOKEN_URL.clone()
}
