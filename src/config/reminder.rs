use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    /// Scheduler tick period.
    /// TOML: `reminder.tick_secs`. Default: `60`.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Local hour of day at which reminders fire.
    /// TOML: `reminder.hour`. Default: `20`.
    #[serde(default = "default_hour")]
    pub hour: u32,

    /// Upper bound for one reminder (summary read + send).
    /// TOML: `reminder.dispatch_timeout_secs`. Default: `30`.
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            hour: default_hour(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
        }
    }
}

fn default_tick_secs() -> u64 {
    60
}

fn default_hour() -> u32 {
    20
}

fn default_dispatch_timeout_secs() -> u64 {
    30
}
