use super::command::Command;
use super::grammar::{LedgerInput, parse_ledger_input};
use super::replies;
use super::session::SessionHandle;
use crate::clock::Clock;
use crate::error::{LedgerError, StoreError};
use crate::ledger::{EntryDraft, LedgerStore, Position};
use crate::nominal;
use crate::reminder::{PreferenceHandle, ReminderPeriod, UserPreference};
use crate::summary::{PeriodKind, SummaryEngine, render_history, render_last, render_period};
use crate::transport::{ChatId, Inbound, Reply};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const HISTORY_LEN: usize = 5;

/// Turns inbound chat events into ledger operations, queries and replies.
///
/// Per chat the router is either idle or awaiting replacement data for one
/// ledger position (an edit session, owned by the session actor). Commands
/// are handled the same way in both states and never end a session; only
/// `/edit` starts or retargets one.
#[derive(Clone)]
pub struct ConversationRouter {
    ledger: Arc<dyn LedgerStore>,
    summary: SummaryEngine,
    sessions: SessionHandle,
    preferences: PreferenceHandle,
    clock: Arc<dyn Clock>,
    reject_unparsed_nominal: bool,
}

impl ConversationRouter {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        sessions: SessionHandle,
        preferences: PreferenceHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            summary: SummaryEngine::new(ledger.clone()),
            ledger,
            sessions,
            preferences,
            clock,
            reject_unparsed_nominal: false,
        }
    }

    /// Reply with an error instead of recording `0` for an unparseable nominal.
    pub fn reject_unparsed_nominal(mut self, reject: bool) -> Self {
        self.reject_unparsed_nominal = reject;
        self
    }

    pub fn summary(&self) -> &SummaryEngine {
        &self.summary
    }

    /// Handles one inbound event. `None` means there is nothing to say
    /// (an unrelated button token).
    pub async fn handle(&self, inbound: Inbound) -> Option<Reply> {
        match inbound {
            Inbound::Message { chat_id, text } => Some(self.handle_message(chat_id, &text).await),
            Inbound::Choice { chat_id, token } => self.handle_choice(chat_id, &token).await,
        }
    }

    async fn handle_message(&self, chat_id: ChatId, text: &str) -> Reply {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(chat_id, command).await;
        }

        match self.sessions.current(chat_id).await {
            Ok(Some(position)) => self.continue_edit(chat_id, position, text).await,
            Ok(None) => self.append(chat_id, text).await,
            Err(e) => {
                error!(chat_id, error = %e, "Edit session lookup failed");
                Reply::text(replies::INTERNAL_FAILURE)
            }
        }
    }

    /// Builds the draft for a parsed message, or the reply that rejects it.
    fn draft(&self, input: &LedgerInput<'_>) -> Result<EntryDraft, Reply> {
        let amount = if self.reject_unparsed_nominal {
            nominal::try_parse(input.nominal).map_err(|err| {
                warn!(input = %input.nominal, error = %err, "Rejected nominal");
                Reply::text(replies::invalid_nominal(input.nominal))
            })?
        } else {
            nominal::parse(input.nominal)
        };
        Ok(EntryDraft::new(
            self.clock.today(),
            amount,
            input.category,
            input.note,
        ))
    }

    async fn append(&self, chat_id: ChatId, text: &str) -> Reply {
        let Some(input) = parse_ledger_input(text) else {
            return Reply::text(replies::FORMAT_HINT);
        };
        let draft = match self.draft(&input) {
            Ok(draft) => draft,
            Err(reply) => return reply,
        };

        match self.ledger.append_row(&draft).await {
            Ok(position) => {
                info!(chat_id, position, amount = draft.amount, "Ledger entry appended");
                let total = self
                    .summary
                    .total()
                    .await
                    .inspect_err(|e| warn!(chat_id, error = %e, "Failed to read total after append"))
                    .ok();
                Reply::text(replies::appended(&draft, total))
            }
            Err(e) => {
                error!(chat_id, error = %e, "Failed to append ledger entry");
                Reply::text(replies::APPEND_FAILED)
            }
        }
    }

    async fn continue_edit(&self, chat_id: ChatId, position: Position, text: &str) -> Reply {
        // Malformed input keeps the session so the user can retry.
        let Some(input) = parse_ledger_input(text) else {
            return Reply::text(replies::EDIT_FORMAT_HINT);
        };
        let draft = match self.draft(&input) {
            Ok(draft) => draft,
            Err(reply) => return reply,
        };

        let result = self.ledger.update_row(position, &draft).await;
        if let Err(e) = self.sessions.finish(chat_id, position).await {
            warn!(chat_id, position, error = %e, "Failed to end edit session");
        }

        match result {
            Ok(()) => {
                info!(chat_id, position, amount = draft.amount, "Ledger entry edited");
                Reply::text(replies::edited(&draft.at(position)))
            }
            Err(e) => {
                error!(chat_id, position, error = %e, "Failed to edit ledger entry");
                Reply::text(replies::EDIT_FAILED)
            }
        }
    }

    async fn begin_edit(&self, chat_id: ChatId, position: Position) -> Reply {
        let entry = match self.ledger.get_row(position).await {
            Ok(entry) => entry,
            Err(LedgerError::NotFound(_)) => return Reply::text(replies::ENTRY_NOT_FOUND),
            Err(LedgerError::Store(e)) => {
                error!(chat_id, position, error = %e, "Failed to read ledger entry");
                return Reply::text(replies::ENTRY_LOOKUP_FAILED);
            }
        };

        if let Err(e) = self.sessions.begin(chat_id, position).await {
            error!(chat_id, position, error = %e, "Failed to start edit session");
            return Reply::text(replies::INTERNAL_FAILURE);
        }
        Reply::text(replies::edit_prompt(&entry))
    }

    async fn handle_command(&self, chat_id: ChatId, command: Command) -> Reply {
        debug!(chat_id, ?command, "Command received");
        match command {
            Command::Start => Reply::text(replies::START),
            Command::Help => Reply::text(replies::HELP),
            Command::Edit(Some(position)) => self.begin_edit(chat_id, position).await,
            Command::Edit(None) => Reply::text(replies::INVALID_ENTRY_NUMBER),
            Command::Summary => match self.summary.total().await {
                Ok(total) => Reply::text(replies::summary_total(total)),
                Err(e) => failed(chat_id, "summary", &e, replies::SUMMARY_FAILED),
            },
            Command::Weekly => self.period(chat_id, PeriodKind::Weekly, replies::WEEKLY_FAILED).await,
            Command::Monthly => {
                self.period(chat_id, PeriodKind::Monthly, replies::MONTHLY_FAILED)
                    .await
            }
            Command::Last => match self.summary.last_entry().await {
                Ok(Some(entry)) => Reply::text(render_last(&entry)),
                Ok(None) => Reply::text(crate::summary::NO_DATA_TEXT),
                Err(e) => failed(chat_id, "last", &e, replies::LAST_FAILED),
            },
            Command::Remove => self.remove_last(chat_id).await,
            Command::History => match self.summary.recent_entries(HISTORY_LEN).await {
                Ok(entries) => Reply::text(render_history(&entries)),
                Err(e) => failed(chat_id, "history", &e, replies::HISTORY_FAILED),
            },
            Command::Reminder => {
                Reply::text(replies::REMINDER_PROMPT).with_keyboard(replies::reminder_keyboard())
            }
            Command::Unknown(word) => {
                debug!(chat_id, command = %word, "Unknown command");
                Reply::text(replies::UNKNOWN_COMMAND)
            }
        }
    }

    async fn period(&self, chat_id: ChatId, kind: PeriodKind, failure: &'static str) -> Reply {
        match self.summary.period_summary(kind, self.clock.now()).await {
            Ok(summary) => Reply::text(render_period(&summary)),
            Err(e) => failed(chat_id, "period summary", &e, failure),
        }
    }

    async fn remove_last(&self, chat_id: ChatId) -> Reply {
        let last = match self.summary.last_entry().await {
            Ok(last) => last,
            Err(e) => return failed(chat_id, "remove", &e, replies::LAST_FAILED),
        };

        match self.ledger.remove_last_row().await {
            Ok(position) => {
                info!(chat_id, position, "Last ledger entry removed");
                let echoed = last.as_ref().filter(|entry| entry.position == position);
                Reply::text(replies::removed(echoed, position))
            }
            Err(StoreError::EmptyLedger) => Reply::text(replies::NOTHING_TO_REMOVE),
            Err(e) => failed(chat_id, "remove", &e, replies::REMOVE_FAILED),
        }
    }

    async fn handle_choice(&self, chat_id: ChatId, token: &str) -> Option<Reply> {
        let Some(period) = ReminderPeriod::from_callback(token) else {
            debug!(chat_id, token, "Ignoring unrelated callback");
            return None;
        };

        let pref = UserPreference::new(chat_id, period).sent_at(self.clock.now().with_timezone(&Utc));
        let text = match self.preferences.set(pref).await {
            Ok(()) => replies::reminder_confirmation(period),
            Err(e) => {
                error!(chat_id, error = %e, "Failed to save reminder preference");
                replies::REMINDER_SAVE_FAILED
            }
        };
        Some(Reply::text(text))
    }
}

fn failed(chat_id: ChatId, op: &str, err: &StoreError, text: &'static str) -> Reply {
    error!(chat_id, op, error = %err, "Ledger query failed");
    Reply::text(text)
}
