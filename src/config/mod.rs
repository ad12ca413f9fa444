mod basic;
mod ledger;
mod reminder;
mod storage;
mod telegram;

pub use basic::BasicConfig;
pub use ledger::LedgerConfig;
pub use reminder::ReminderConfig;
pub use storage::{DEFAULT_SHEETS_API_URL, DEFAULT_TOKEN_URL, StorageBackend, StorageConfig};
pub use telegram::{DEFAULT_TELEGRAM_API_URL, TelegramConfig, TransportMode};

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Process-level settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Bot API credentials and transport selection.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Ledger and preference backend.
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub reminder: ReminderConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "DOMPET_CONFIG";
const ENV_PREFIX: &str = "DOMPET_";

/// Unprefixed deployment variables, mapped onto their nested keys.
const LEGACY_ENV: [(&str, &str); 6] = [
    ("BOT_TOKEN", "telegram.bot_token"),
    ("MODE", "telegram.mode"),
    ("WEBHOOK_URL", "telegram.webhook_url"),
    ("PORT", "basic.listen_port"),
    ("SPREADSHEET_ID", "storage.spreadsheet_id"),
    ("GOOGLE_CREDENTIALS_BASE64", "storage.credentials_base64"),
];

impl Config {
    /// Builds a Figment: defaults, then the TOML file if present, then the
    /// legacy variables, then `DOMPET_`-prefixed variables (`__` separates tables).
    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.is_file() {
            figment = figment.merge(Toml::file(path));
        }

        let legacy_keys = LEGACY_ENV.map(|(env, _)| env);
        figment
            .merge(Env::raw().only(&legacy_keys).map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(env, _)| key == *env)
                    .map_or_else(|| key.as_str().to_owned().into(), |(_, path)| Uncased::from(*path))
            }))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["CONFIG"])
                    .split("__"),
            )
    }

    /// Extracts and validates the configuration. Any error here is fatal.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks required values for the selected transport mode and backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Missing("telegram.bot_token"));
        }
        if self.telegram.mode == TransportMode::Webhook && self.telegram.webhook_url.is_none() {
            return Err(ConfigError::Missing("telegram.webhook_url"));
        }
        if self.telegram.send_rate_per_sec == 0 {
            return Err(ConfigError::Invalid {
                key: "telegram.send_rate_per_sec",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.storage.backend == StorageBackend::Sheets {
            if self.storage.spreadsheet_id.trim().is_empty() {
                return Err(ConfigError::Missing("storage.spreadsheet_id"));
            }
            if self.storage.credentials_base64.trim().is_empty() {
                return Err(ConfigError::Missing("storage.credentials_base64"));
            }
        }

        if self.reminder.hour > 23 {
            return Err(ConfigError::Invalid {
                key: "reminder.hour",
                reason: format!("{} is not an hour of day", self.reminder.hour),
            });
        }
        if self.reminder.tick_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "reminder.tick_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.basic.utc_offset_minutes.is_some() && self.basic.utc_offset().is_none() {
            return Err(ConfigError::Invalid {
                key: "basic.utc_offset_minutes",
                reason: "offset must lie strictly within one day".to_string(),
            });
        }
        Ok(())
    }
}
