use super::cell::{Cell, ColumnSpec, RawRow};
use super::entry::{EntryDraft, LedgerEntry, Position};
use super::store::LedgerStore;
use crate::error::{LedgerError, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process ledger. Positions start at 1 (there is no header row).
#[derive(Debug, Default)]
pub struct MemoryLedger {
    rows: RwLock<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ledger with entries, renumbering them in order.
    pub fn with_entries(drafts: impl IntoIterator<Item = EntryDraft>) -> Self {
        let rows = drafts
            .into_iter()
            .zip(1..)
            .map(|(draft, position)| draft.at(position))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.rows.read().await.clone()
    }
}

fn index_of(position: Position, len: usize) -> Option<usize> {
    let index = usize::try_from(position).ok()?.checked_sub(1)?;
    (index < len).then_some(index)
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn append_row(&self, draft: &EntryDraft) -> Result<Position, StoreError> {
        let mut rows = self.rows.write().await;
        let position = Position::try_from(rows.len() + 1)
            .map_err(|_| StoreError::Backend("ledger is full".to_string()))?;
        rows.push(draft.at(position));
        Ok(position)
    }

    async fn get_row(&self, position: Position) -> Result<LedgerEntry, LedgerError> {
        let rows = self.rows.read().await;
        index_of(position, rows.len())
            .map(|index| rows[index].clone())
            .ok_or(LedgerError::NotFound(position))
    }

    async fn update_row(&self, position: Position, draft: &EntryDraft) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let index = index_of(position, rows.len())
            .ok_or_else(|| StoreError::Backend(format!("row {position} does not exist")))?;
        rows[index] = draft.at(position);
        Ok(())
    }

    async fn remove_last_row(&self) -> Result<Position, StoreError> {
        let mut rows = self.rows.write().await;
        rows.pop()
            .map(|entry| entry.position)
            .ok_or(StoreError::EmptyLedger)
    }

    async fn scan_rows(&self, columns: ColumnSpec) -> Result<Vec<RawRow>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .map(|entry| {
                let mut row = RawRow::from_entry(entry);
                if columns == ColumnSpec::Amounts {
                    for (index, cell) in row.cells.iter_mut().enumerate() {
                        if index != columns.offset() {
                            *cell = Cell::Empty;
                        }
                    }
                }
                row
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(amount: i64, note: &str) -> EntryDraft {
        EntryDraft::new(
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            amount,
            "Makanan",
            note,
        )
    }

    #[tokio::test]
    async fn appended_entry_reads_back_at_its_position() {
        let ledger = MemoryLedger::new();
        let first = ledger.append_row(&draft(10_000, "a")).await.unwrap();
        let second = ledger.append_row(&draft(20_000, "b")).await.unwrap();
        assert_eq!((first, second), (1, 2));

        let entry = ledger.get_row(second).await.unwrap();
        assert_eq!(entry.amount, 20_000);
        assert_eq!(entry.category, "Makanan");
        assert_eq!(entry.note, "b");
    }

    #[tokio::test]
    async fn out_of_range_positions_are_not_found() {
        let ledger = MemoryLedger::with_entries([draft(1, "x")]);
        assert!(matches!(ledger.get_row(0).await, Err(LedgerError::NotFound(0))));
        assert!(matches!(ledger.get_row(2).await, Err(LedgerError::NotFound(2))));
    }

    #[tokio::test]
    async fn remove_on_empty_ledger_fails_without_mutation() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.remove_last_row().await,
            Err(StoreError::EmptyLedger)
        ));
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn remove_only_drops_the_last_row() {
        let ledger = MemoryLedger::with_entries([draft(1, "x"), draft(2, "y")]);
        assert_eq!(ledger.remove_last_row().await.unwrap(), 2);
        assert_eq!(ledger.len().await, 1);
        assert_eq!(ledger.append_row(&draft(3, "z")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_a_store_error() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.update_row(1, &draft(1, "x")).await,
            Err(StoreError::Backend(_))
        ));
    }
}
