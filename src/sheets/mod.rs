//! Google Sheets storage backend.

mod client;
mod ledger;
mod preferences;

pub use client::SheetsClient;
pub use ledger::SheetsLedger;
pub use preferences::SheetsPreferences;
