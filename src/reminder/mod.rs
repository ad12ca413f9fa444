//! Reminder preferences and the scheduler that turns them into notifications.

mod actor;
mod due;
mod preference;
mod scheduler;

pub use actor::{PreferenceHandle, PreferenceMessage, spawn};
pub use due::is_due;
pub use preference::{MemoryPreferences, PreferenceStore, ReminderPeriod, UserPreference};
pub use scheduler::{ReminderScheduler, SchedulerSettings, reminder_text};
