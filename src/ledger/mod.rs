//! Ledger data model and the storage seams the rest of the bot talks to.

mod cell;
mod entry;
mod memory;
mod store;

pub use cell::{Cell, ColumnSpec, RawRow, RowError};
pub use entry::{DATE_FORMAT, EntryDraft, LedgerEntry, Position};
pub use memory::MemoryLedger;
pub use store::LedgerStore;
