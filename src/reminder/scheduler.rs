use super::actor::PreferenceHandle;
use super::preference::UserPreference;
use crate::clock::Clock;
use crate::config::ReminderConfig;
use crate::error::DompetError;
use crate::summary::{PeriodSummary, SummaryEngine, render_period};
use crate::transport::{ChatTransport, Reply};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub tick: Duration,
    pub hour: u32,
    pub dispatch_timeout: Duration,
}

impl From<&ReminderConfig> for SchedulerSettings {
    fn from(cfg: &ReminderConfig) -> Self {
        Self {
            tick: Duration::from_secs(cfg.tick_secs),
            hour: cfg.hour,
            dispatch_timeout: Duration::from_secs(cfg.dispatch_timeout_secs),
        }
    }
}

/// Text sent for a due reminder.
pub fn reminder_text(pref: &UserPreference, summary: &PeriodSummary) -> String {
    format!(
        "🔔 Pengingat {}:\n\n{}",
        pref.period.label(),
        render_period(summary)
    )
}

/// Everything one dispatch needs, cloned into its task.
#[derive(Clone)]
struct DispatchContext {
    preferences: PreferenceHandle,
    summary: SummaryEngine,
    transport: Arc<dyn ChatTransport>,
    timeout: Duration,
}

impl DispatchContext {
    async fn deliver(&self, pref: &UserPreference, now: DateTime<FixedOffset>) -> Result<(), DompetError> {
        let Some(kind) = pref.period.summary_kind() else {
            return Ok(());
        };
        let summary = self.summary.period_summary(kind, now).await?;
        let reply = Reply::text(reminder_text(pref, &summary));
        self.transport.send(pref.chat_id, &reply).await?;
        Ok(())
    }

    /// Sends one reminder and releases the chat's claim. The chat is marked
    /// sent only when delivery succeeded.
    async fn dispatch(self, pref: UserPreference, now: DateTime<FixedOffset>) {
        let chat_id = pref.chat_id;
        let sent_at: Option<DateTime<Utc>> =
            match tokio::time::timeout(self.timeout, self.deliver(&pref, now)).await {
                Ok(Ok(())) => {
                    info!(chat_id, period = pref.period.as_str(), "Reminder sent");
                    Some(now.with_timezone(&Utc))
                }
                Ok(Err(e)) => {
                    warn!(chat_id, error = %e, "Reminder dispatch failed");
                    None
                }
                Err(_) => {
                    warn!(chat_id, timeout = ?self.timeout, "Reminder dispatch timed out");
                    None
                }
            };

        if let Err(e) = self.preferences.complete_dispatch(chat_id, sent_at).await {
            warn!(chat_id, error = %e, "Failed to record reminder dispatch");
        }
    }
}

/// Periodically evaluates reminder preferences and dispatches due ones.
///
/// Each due chat is claimed in the preference actor before its dispatch task
/// starts, and stays ineligible until that task reports back, so a slow
/// delivery cannot be picked up again by the next tick.
pub struct ReminderScheduler {
    ctx: DispatchContext,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
    in_flight: JoinSet<()>,
}

impl ReminderScheduler {
    pub fn new(
        preferences: PreferenceHandle,
        summary: SummaryEngine,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            ctx: DispatchContext {
                preferences,
                summary,
                transport,
                timeout: settings.dispatch_timeout,
            },
            clock,
            settings,
            in_flight: JoinSet::new(),
        }
    }

    /// One evaluation pass. Returns how many dispatches were started; it does
    /// not wait for them.
    pub async fn tick(&mut self) -> usize {
        self.reap();

        let now = self.clock.now();
        let due = match self.ctx.preferences.claim_due(now, self.settings.hour).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "Failed to evaluate reminder preferences");
                return 0;
            }
        };

        let started = due.len();
        for pref in due {
            debug!(chat_id = pref.chat_id, period = pref.period.as_str(), "Reminder due");
            self.in_flight.spawn(self.ctx.clone().dispatch(pref, now));
        }
        started
    }

    /// Waits for every in-flight dispatch.
    pub async fn drain(&mut self) {
        while let Some(res) = self.in_flight.join_next().await {
            if let Err(e) = res {
                warn!(error = %e, "Reminder dispatch task panicked");
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn reap(&mut self) {
        while let Some(res) = self.in_flight.try_join_next() {
            if let Err(e) = res {
                warn!(error = %e, "Reminder dispatch task panicked");
            }
        }
    }

    /// Ticks until `shutdown` flips to `true` (or its sender is dropped), then
    /// gives in-flight dispatches up to `grace` to finish.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>, grace: Duration) {
        let mut interval = tokio::time::interval(self.settings.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the first evaluation happens one period in.
        interval.tick().await;

        info!(
            tick = ?self.settings.tick,
            hour = self.settings.hour,
            "Reminder scheduler started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let pending = self.in_flight();
        info!(pending, "Reminder scheduler stopping");
        if tokio::time::timeout(grace, self.drain()).await.is_err() {
            warn!(
                remaining = self.in_flight(),
                "Grace period elapsed; aborting reminder dispatches"
            );
            self.in_flight.abort_all();
        }
        info!("Reminder scheduler stopped");
    }
}
