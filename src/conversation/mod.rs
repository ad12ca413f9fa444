//! Chat-side command interpreter and edit-session state.

mod command;
mod grammar;
pub mod replies;
mod router;
mod session;

pub use command::Command;
pub use grammar::{LedgerInput, parse_ledger_input};
pub use router::ConversationRouter;
pub use session::{SessionHandle, SessionMessage, spawn as spawn_sessions};
