use super::cell::{ColumnSpec, RawRow};
use super::entry::{EntryDraft, LedgerEntry, Position};
use crate::error::{LedgerError, StoreError};
use async_trait::async_trait;

/// Row-addressed access to the expense ledger.
///
/// Every write is a single backend call, so a failed call leaves the ledger
/// as it was.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Writes a new row after the current last row and returns its position.
    async fn append_row(&self, draft: &EntryDraft) -> Result<Position, StoreError>;

    /// Reads one row. Out-of-range and malformed rows are `NotFound`.
    async fn get_row(&self, position: Position) -> Result<LedgerEntry, LedgerError>;

    /// Overwrites an existing row in place.
    async fn update_row(&self, position: Position, draft: &EntryDraft) -> Result<(), StoreError>;

    /// Clears the highest-position row and returns the position it had.
    /// Fails with `StoreError::EmptyLedger` when there is nothing to remove.
    async fn remove_last_row(&self) -> Result<Position, StoreError>;

    /// Every stored row in position order, including ones that do not parse.
    async fn scan_rows(&self, columns: ColumnSpec) -> Result<Vec<RawRow>, StoreError>;
}
