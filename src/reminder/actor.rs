use super::due::is_due;
use super::preference::{PreferenceStore, UserPreference};
use crate::error::{DompetError, StoreError};
use crate::transport::ChatId;
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, FixedOffset, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub enum PreferenceMessage {
    /// Persist then adopt a user's choice.
    Set(UserPreference, RpcReplyPort<Result<(), StoreError>>),

    Get(ChatId, RpcReplyPort<Option<UserPreference>>),

    /// Return preferences due at (now, hour) and mark them in flight.
    ClaimDue(DateTime<FixedOffset>, u32, RpcReplyPort<Vec<UserPreference>>),

    /// Release an in-flight claim; `Some(at)` records a delivered reminder.
    CompleteDispatch(
        ChatId,
        Option<DateTime<Utc>>,
        RpcReplyPort<Result<(), StoreError>>,
    ),
}

/// Cloneable handle to the actor that owns the preference table.
#[derive(Clone)]
pub struct PreferenceHandle {
    actor: ActorRef<PreferenceMessage>,
}

fn rpc_failed(op: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Ractor(format!("PreferenceActor {op} RPC failed: {e}"))
}

impl PreferenceHandle {
    pub async fn set(&self, pref: UserPreference) -> Result<(), StoreError> {
        ractor::call!(self.actor, PreferenceMessage::Set, pref).map_err(|e| rpc_failed("Set", e))?
    }

    pub async fn get(&self, chat_id: ChatId) -> Result<Option<UserPreference>, StoreError> {
        ractor::call!(self.actor, PreferenceMessage::Get, chat_id).map_err(|e| rpc_failed("Get", e))
    }

    pub async fn claim_due(
        &self,
        now: DateTime<FixedOffset>,
        hour: u32,
    ) -> Result<Vec<UserPreference>, StoreError> {
        ractor::call!(self.actor, PreferenceMessage::ClaimDue, now, hour)
            .map_err(|e| rpc_failed("ClaimDue", e))
    }

    pub async fn complete_dispatch(
        &self,
        chat_id: ChatId,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        ractor::call!(
            self.actor,
            PreferenceMessage::CompleteDispatch,
            chat_id,
            sent_at
        )
        .map_err(|e| rpc_failed("CompleteDispatch", e))?
    }
}

struct PreferenceState {
    store: Arc<dyn PreferenceStore>,
    prefs: AHashMap<ChatId, UserPreference>,
    in_flight: AHashSet<ChatId>,
}

struct PreferenceActor;

#[ractor::async_trait]
impl Actor for PreferenceActor {
    type Msg = PreferenceMessage;
    type State = PreferenceState;
    type Arguments = Arc<dyn PreferenceStore>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        store: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let prefs = match store.load_all().await {
            Ok(rows) => rows.into_iter().map(|p| (p.chat_id, p)).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load reminder preferences; starting empty");
                AHashMap::new()
            }
        };
        info!(count = prefs.len(), "PreferenceActor initialized");
        Ok(PreferenceState {
            store,
            prefs,
            in_flight: AHashSet::new(),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            PreferenceMessage::Set(pref, reply) => {
                let res = state.store.save(&pref).await;
                if res.is_ok() {
                    info!(chat_id = pref.chat_id, period = pref.period.as_str(), "Reminder preference saved");
                    state.prefs.insert(pref.chat_id, pref);
                }
                let _ = reply.send(res);
            }
            PreferenceMessage::Get(chat_id, reply) => {
                let _ = reply.send(state.prefs.get(&chat_id).cloned());
            }
            PreferenceMessage::ClaimDue(now, hour, reply) => {
                let mut due: Vec<UserPreference> = state
                    .prefs
                    .values()
                    .filter(|p| !state.in_flight.contains(&p.chat_id) && is_due(p, now, hour))
                    .cloned()
                    .collect();
                due.sort_by_key(|p| p.chat_id);
                state.in_flight.extend(due.iter().map(|p| p.chat_id));
                let _ = reply.send(due);
            }
            PreferenceMessage::CompleteDispatch(chat_id, sent_at, reply) => {
                state.in_flight.remove(&chat_id);
                let res = match (sent_at, state.prefs.get_mut(&chat_id)) {
                    (Some(at), Some(pref)) => {
                        pref.last_sent_at = at;
                        let snapshot = pref.clone();
                        state.store.save(&snapshot).await
                    }
                    _ => Ok(()),
                };
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

/// Spawns the preference actor, loading the table from `store` first.
pub async fn spawn(store: Arc<dyn PreferenceStore>) -> Result<PreferenceHandle, DompetError> {
    let (actor, _jh) = Actor::spawn(None, PreferenceActor, store)
        .await
        .map_err(|e| DompetError::Ractor(format!("failed to spawn PreferenceActor: {e}")))?;
    Ok(PreferenceHandle { actor })
}
