//! Aggregation over the ledger: running total, period windows, recent entries.

mod render;
mod window;

pub use render::{
    NO_DATA_TEXT, format_rupiah, render_entry_line, render_history, render_last, render_period,
};
pub use window::{DateWindow, PeriodKind};

use crate::error::StoreError;
use crate::ledger::{ColumnSpec, LedgerEntry, LedgerStore, RawRow};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::debug;

/// Entries and total for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSummary {
    pub kind: PeriodKind,
    pub window: DateWindow,
    pub total: i64,
    pub entries: Vec<LedgerEntry>,
}

impl PeriodSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone)]
pub struct SummaryEngine {
    store: Arc<dyn LedgerStore>,
}

impl SummaryEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Sum of the Amount column. Non-numeric cells (header, blanks) are skipped.
    pub async fn total(&self) -> Result<i64, StoreError> {
        let rows = self.store.scan_rows(ColumnSpec::Amounts).await?;
        Ok(rows
            .iter()
            .filter_map(RawRow::amount)
            .fold(0_i64, i64::saturating_add))
    }

    /// Every row that parses as an entry, in position order.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = self.store.scan_rows(ColumnSpec::Entries).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                row.to_entry()
                    .inspect_err(|err| debug!(error = %err, "Skipping ledger row"))
                    .ok()
            })
            .collect())
    }

    pub async fn period_summary(
        &self,
        kind: PeriodKind,
        now: DateTime<FixedOffset>,
    ) -> Result<PeriodSummary, StoreError> {
        let window = DateWindow::for_period(kind, now.date_naive());
        let entries: Vec<LedgerEntry> = self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| window.contains(entry.date))
            .collect();
        let total = entries
            .iter()
            .map(|entry| entry.amount)
            .fold(0_i64, i64::saturating_add);

        Ok(PeriodSummary {
            kind,
            window,
            total,
            entries,
        })
    }

    pub async fn last_entry(&self) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self.entries().await?.pop())
    }

    /// Up to `count` most recent entries, oldest first.
    pub async fn recent_entries(&self, count: usize) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut entries = self.entries().await?;
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }
}
