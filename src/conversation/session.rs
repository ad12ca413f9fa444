use crate::error::DompetError;
use crate::ledger::Position;
use crate::transport::ChatId;
use ahash::AHashMap;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tracing::debug;

#[derive(Debug)]
pub enum SessionMessage {
    /// Position the chat is currently editing, if any.
    Current(ChatId, RpcReplyPort<Option<Position>>),

    /// Start (or retarget) an edit session.
    Begin(ChatId, Position, RpcReplyPort<()>),

    /// End the session only if it still targets `Position`. Replies whether it did.
    Finish(ChatId, Position, RpcReplyPort<bool>),
}

/// Cloneable handle to the actor that owns the edit-session table.
#[derive(Clone)]
pub struct SessionHandle {
    actor: ActorRef<SessionMessage>,
}

fn rpc_failed(op: &str, e: impl std::fmt::Display) -> DompetError {
    DompetError::Ractor(format!("SessionActor {op} RPC failed: {e}"))
}

impl SessionHandle {
    pub async fn current(&self, chat_id: ChatId) -> Result<Option<Position>, DompetError> {
        ractor::call!(self.actor, SessionMessage::Current, chat_id)
            .map_err(|e| rpc_failed("Current", e))
    }

    pub async fn begin(&self, chat_id: ChatId, position: Position) -> Result<(), DompetError> {
        ractor::call!(self.actor, SessionMessage::Begin, chat_id, position)
            .map_err(|e| rpc_failed("Begin", e))
    }

    pub async fn finish(&self, chat_id: ChatId, position: Position) -> Result<bool, DompetError> {
        ractor::call!(self.actor, SessionMessage::Finish, chat_id, position)
            .map_err(|e| rpc_failed("Finish", e))
    }
}

struct SessionActor;

#[ractor::async_trait]
impl Actor for SessionActor {
    type Msg = SessionMessage;
    type State = AHashMap<ChatId, Position>;
    type Arguments = ();

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        _args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(AHashMap::new())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        sessions: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SessionMessage::Current(chat_id, reply) => {
                let _ = reply.send(sessions.get(&chat_id).copied());
            }
            SessionMessage::Begin(chat_id, position, reply) => {
                debug!(chat_id, position, "Edit session started");
                sessions.insert(chat_id, position);
                let _ = reply.send(());
            }
            SessionMessage::Finish(chat_id, position, reply) => {
                let ended = sessions.get(&chat_id) == Some(&position);
                if ended {
                    sessions.remove(&chat_id);
                    debug!(chat_id, position, "Edit session ended");
                }
                let _ = reply.send(ended);
            }
        }
        Ok(())
    }
}

pub async fn spawn() -> Result<SessionHandle, DompetError> {
    let (actor, _jh) = Actor::spawn(None, SessionActor, ())
        .await
        .map_err(|e| DompetError::Ractor(format!("failed to spawn SessionActor: {e}")))?;
    Ok(SessionHandle { actor })
}
