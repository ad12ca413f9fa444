use super::client::{SheetsClient, a1};
use crate::error::{LedgerError, StoreError};
use crate::ledger::{ColumnSpec, EntryDraft, LedgerEntry, LedgerStore, Position, RawRow};
use async_trait::async_trait;
use dompet_schema::sheets::ValueRange;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

const HEADER: [&str; 5] = ["Position", "Date", "Amount", "Category", "Note"];

/// Ledger kept in a spreadsheet tab: header in row 1, one entry per row
/// after it, columns Position, Date, Amount, Category, Note. An entry's
/// position is its sheet row number.
pub struct SheetsLedger {
    client: SheetsClient,
    sheet: String,
    // Writes read column A before touching a row.
    write_lock: Mutex<()>,
}

impl SheetsLedger {
    pub fn new(client: SheetsClient, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn range(&self, cells: &str) -> String {
        a1(&self.sheet, cells)
    }

    fn row_range(&self, position: Position) -> String {
        self.range(&format!("A{position}:E{position}"))
    }

    /// Writes the header row if row 1 is blank.
    pub async fn ensure_header(&self) -> Result<(), StoreError> {
        let existing = self.client.get_values(&self.range("A1:E1")).await?;
        if existing.values.iter().any(|row| !row.is_empty()) {
            return Ok(());
        }
        let header = HEADER.iter().map(|h| json!(h)).collect();
        self.client
            .update_values(
                &self.range("A1:E1"),
                &ValueRange::single_row(self.range("A1:E1"), header),
            )
            .await?;
        info!(sheet = %self.sheet, "Ledger header written");
        Ok(())
    }

    /// Column A as returned by the API; trailing blank rows are trimmed.
    async fn position_column(&self) -> Result<ValueRange, StoreError> {
        self.client.get_values(&self.range("A:A")).await
    }

    /// Number of the last non-blank row in column A (0 for an empty sheet).
    async fn last_row(&self) -> Result<Position, StoreError> {
        to_position(self.position_column().await?.row_count())
    }

    async fn write_row(&self, position: Position, draft: &EntryDraft) -> Result<(), StoreError> {
        let range = self.row_range(position);
        let row = vec![
            json!(position),
            json!(draft.formatted_date()),
            json!(draft.amount),
            json!(draft.category),
            json!(draft.note),
        ];
        self.client
            .update_values(&range, &ValueRange::single_row(range.clone(), row))
            .await?;
        Ok(())
    }
}

fn to_position(count: usize) -> Result<Position, StoreError> {
    Position::try_from(count).map_err(|_| StoreError::Backend(format!("row {count} out of range")))
}

#[async_trait]
impl LedgerStore for SheetsLedger {
    async fn append_row(&self, draft: &EntryDraft) -> Result<Position, StoreError> {
        let _guard = self.write_lock.lock().await;
        let position = self.last_row().await?.max(1) + 1;
        self.write_row(position, draft).await?;
        debug!(position, "Ledger row appended");
        Ok(position)
    }

    async fn get_row(&self, position: Position) -> Result<LedgerEntry, LedgerError> {
        if position < 2 {
            return Err(LedgerError::NotFound(position));
        }
        let found = self.client.get_values(&self.row_range(position)).await?;
        let values: &[Value] = found.values.first().map(Vec::as_slice).unwrap_or_default();
        if values.is_empty() {
            return Err(LedgerError::NotFound(position));
        }
        RawRow::from_values(position, ColumnSpec::Entries, values)
            .to_entry()
            .map_err(|e| {
                debug!(error = %e, "Ledger row does not parse");
                LedgerError::NotFound(position)
            })
    }

    async fn update_row(&self, position: Position, draft: &EntryDraft) -> Result<(), StoreError> {
        if position < 2 {
            return Err(StoreError::Backend(format!("row {position} is not an entry")));
        }
        let _guard = self.write_lock.lock().await;
        let column = self.position_column().await?;
        let occupied = usize::try_from(position)
            .ok()
            .and_then(|row| column.values.get(row - 1))
            .is_some_and(|cells| !cells.is_empty());
        if !occupied {
            return Err(StoreError::Backend(format!("row {position} does not exist")));
        }
        self.write_row(position, draft).await
    }

    async fn remove_last_row(&self) -> Result<Position, StoreError> {
        let _guard = self.write_lock.lock().await;
        let last = self.last_row().await?;
        if last <= 1 {
            return Err(StoreError::EmptyLedger);
        }
        self.client.clear_values(&self.row_range(last)).await?;
        debug!(position = last, "Ledger row cleared");
        Ok(last)
    }

    async fn scan_rows(&self, columns: ColumnSpec) -> Result<Vec<RawRow>, StoreError> {
        let found = self.client.get_values(&self.range(columns.columns())).await?;
        found
            .values
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, values)| {
                to_position(index + 1).map(|p| RawRow::from_values(p, columns, values))
            })
            .collect()
    }
}
