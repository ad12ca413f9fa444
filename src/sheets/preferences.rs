use super::client::{SheetsClient, a1};
use crate::error::StoreError;
use crate::ledger::Cell;
use crate::reminder::{PreferenceStore, ReminderPeriod, UserPreference};
use crate::transport::ChatId;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dompet_schema::sheets::ValueRange;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

const HEADER: [&str; 3] = ["ChatID", "ReminderType", "LastReminderDate"];
const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Reminder preferences in their own tab: ChatID, ReminderType,
/// LastReminderDate, one row per chat after the header.
pub struct SheetsPreferences {
    client: SheetsClient,
    sheet: String,
}

impl SheetsPreferences {
    pub fn new(client: SheetsClient, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
        }
    }

    fn range(&self, cells: &str) -> String {
        a1(&self.sheet, cells)
    }

    pub async fn ensure_header(&self) -> Result<(), StoreError> {
        let range = self.range("A1:C1");
        let existing = self.client.get_values(&range).await?;
        if existing.values.iter().any(|row| !row.is_empty()) {
            return Ok(());
        }
        let header = HEADER.iter().map(|h| json!(h)).collect();
        self.client
            .update_values(&range, &ValueRange::single_row(range.clone(), header))
            .await?;
        info!(sheet = %self.sheet, "Preferences header written");
        Ok(())
    }
}

fn chat_id_of(cell: Option<&Value>) -> Option<ChatId> {
    cell.map(Cell::from).and_then(|c| c.as_integer())
}

/// `YYYY-MM-DD` (midnight UTC) or RFC 3339; anything else is the epoch.
fn parse_last_sent(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, STORED_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn preference_from_row(row: &[Value]) -> Option<UserPreference> {
    let chat_id = chat_id_of(row.first())?;
    let period = row
        .get(1)
        .map(Cell::from)
        .map_or(ReminderPeriod::None, |c| ReminderPeriod::parse_lenient(&c.as_text()));
    let last_sent_at = row
        .get(2)
        .map(Cell::from)
        .map_or(DateTime::UNIX_EPOCH, |c| parse_last_sent(&c.as_text()));
    Some(UserPreference {
        chat_id,
        period,
        last_sent_at,
    })
}

#[async_trait]
impl PreferenceStore for SheetsPreferences {
    async fn load_all(&self) -> Result<Vec<UserPreference>, StoreError> {
        let found = self.client.get_values(&self.range("A:C")).await?;
        let prefs: Vec<UserPreference> = found
            .values
            .iter()
            .skip(1)
            .filter_map(|row| {
                let pref = preference_from_row(row);
                if pref.is_none() && !row.is_empty() {
                    warn!(row = ?row, "Skipping preference row without a chat id");
                }
                pref
            })
            .collect();
        debug!(count = prefs.len(), "Preferences loaded");
        Ok(prefs)
    }

    async fn save(&self, pref: &UserPreference) -> Result<(), StoreError> {
        let ids = self.client.get_values(&self.range("A:A")).await?;
        let existing = ids
            .values
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| chat_id_of(row.first()) == Some(pref.chat_id))
            .map(|(index, _)| index + 1);
        let row_number = existing.unwrap_or_else(|| ids.row_count().max(1) + 1);

        let range = self.range(&format!("A{row_number}:C{row_number}"));
        let row = vec![
            json!(pref.chat_id.to_string()),
            json!(pref.period.as_str()),
            json!(pref.last_sent_at.format(STORED_DATE_FORMAT).to_string()),
        ];
        self.client
            .update_values(&range, &ValueRange::single_row(range.clone(), row))
            .await?;
        debug!(chat_id = pref.chat_id, row = row_number, "Preference saved");
        Ok(())
    }
}
