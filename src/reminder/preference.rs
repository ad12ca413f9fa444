use crate::error::StoreError;
use crate::summary::PeriodKind;
use crate::transport::ChatId;
use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const CALLBACK_PREFIX: &str = "reminder_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPeriod {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl ReminderPeriod {
    pub const ALL: [ReminderPeriod; 4] = [
        ReminderPeriod::Daily,
        ReminderPeriod::Weekly,
        ReminderPeriod::Monthly,
        ReminderPeriod::None,
    ];

    /// Stored form (`daily`, `weekly`, `monthly`, `none`).
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderPeriod::None => "none",
            ReminderPeriod::Daily => "daily",
            ReminderPeriod::Weekly => "weekly",
            ReminderPeriod::Monthly => "monthly",
        }
    }

    /// Reads the stored form; anything unrecognised is `None`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => ReminderPeriod::Daily,
            "weekly" => ReminderPeriod::Weekly,
            "monthly" => ReminderPeriod::Monthly,
            _ => ReminderPeriod::None,
        }
    }

    /// Maps a `reminder_<period>` button token.
    pub fn from_callback(token: &str) -> Option<Self> {
        match token.strip_prefix(CALLBACK_PREFIX)? {
            "daily" => Some(ReminderPeriod::Daily),
            "weekly" => Some(ReminderPeriod::Weekly),
            "monthly" => Some(ReminderPeriod::Monthly),
            "none" => Some(ReminderPeriod::None),
            _ => None,
        }
    }

    pub fn callback_token(self) -> String {
        format!("{CALLBACK_PREFIX}{}", self.as_str())
    }

    pub fn summary_kind(self) -> Option<PeriodKind> {
        match self {
            ReminderPeriod::None => None,
            ReminderPeriod::Daily => Some(PeriodKind::Daily),
            ReminderPeriod::Weekly => Some(PeriodKind::Weekly),
            ReminderPeriod::Monthly => Some(PeriodKind::Monthly),
        }
    }

    /// Word used in reminder texts.
    pub fn label(self) -> &'static str {
        match self {
            ReminderPeriod::None => "mati",
            ReminderPeriod::Daily => "harian",
            ReminderPeriod::Weekly => "mingguan",
            ReminderPeriod::Monthly => "bulanan",
        }
    }

    /// Button caption in the `/reminder` keyboard.
    pub fn button_label(self) -> &'static str {
        match self {
            ReminderPeriod::None => "Matikan",
            ReminderPeriod::Daily => "Harian",
            ReminderPeriod::Weekly => "Mingguan",
            ReminderPeriod::Monthly => "Bulanan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub chat_id: ChatId,
    pub period: ReminderPeriod,
    pub last_sent_at: DateTime<Utc>,
}

impl UserPreference {
    /// Preference that has never fired (`last_sent_at` at the epoch).
    pub fn new(chat_id: ChatId, period: ReminderPeriod) -> Self {
        Self {
            chat_id,
            period,
            last_sent_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_sent_at = at;
        self
    }
}

/// Durable home of reminder preferences, one row per chat.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<UserPreference>, StoreError>;

    /// Inserts or overwrites the chat's row.
    async fn save(&self, pref: &UserPreference) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    rows: RwLock<AHashMap<ChatId, UserPreference>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(prefs: impl IntoIterator<Item = UserPreference>) -> Self {
        Self {
            rows: RwLock::new(prefs.into_iter().map(|p| (p.chat_id, p)).collect()),
        }
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<UserPreference> {
        self.rows.read().await.get(&chat_id).cloned()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn load_all(&self) -> Result<Vec<UserPreference>, StoreError> {
        let mut prefs: Vec<UserPreference> = self.rows.read().await.values().cloned().collect();
        prefs.sort_by_key(|p| p.chat_id);
        Ok(prefs)
    }

    async fn save(&self, pref: &UserPreference) -> Result<(), StoreError> {
        self.rows.write().await.insert(pref.chat_id, pref.clone());
        Ok(())
    }
}
