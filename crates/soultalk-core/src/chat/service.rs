//! Chat service for session lifecycle operations.
//!
//! ChatService covers everything outside a conversation turn: creating,
//! listing, reading, renaming, and deleting sessions. Every mutating
//! operation is scoped to the (session, owner) pair; a session owned by
//! someone else is reported as not found.

use std::sync::Arc;

use soultalk_types::chat::{Message, Session};
use soultalk_types::error::TurnError;
use tracing::info;

use crate::chat::repository::{HistoryStore, SessionRegistry};
use crate::chat::turn::parse_session_id;

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, TurnError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(TurnError::InvalidInput(format!("{field} is required")))
    } else {
        Ok(trimmed)
    }
}

/// Orchestrates session lifecycle over the registry and the history store.
///
/// Generic over both ports to maintain clean architecture (soultalk-core
/// never depends on soultalk-infra). The stores are shared with the
/// `TurnOrchestrator`.
pub struct ChatService<S: SessionRegistry, H: HistoryStore> {
    sessions: Arc<S>,
    history: Arc<H>,
}

impl<S: SessionRegistry, H: HistoryStore> ChatService<S, H> {
    pub fn new(sessions: Arc<S>, history: Arc<H>) -> Self {
        Self { sessions, history }
    }

    /// Create an empty session for `owner`.
    pub async fn create_session(&self, owner: &str) -> Result<Session, TurnError> {
        let owner = require(owner, "email")?;
        let session = self.sessions.create(&Session::new(owner)).await?;
        info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    /// Sessions of `owner`, newest first.
    pub async fn list_sessions(&self, owner: &str) -> Result<Vec<Session>, TurnError> {
        let owner = require(owner, "email")?;
        Ok(self.sessions.list(owner).await?)
    }

    /// Full message history of a session, oldest first.
    ///
    /// An unknown or malformed session ID yields an empty list.
    pub async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>, TurnError> {
        let session_id = require(session_id, "sessionId")?;
        match parse_session_id(session_id) {
            Ok(id) => Ok(self.history.list_full(&id).await?),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Overwrite the title of a session owned by `owner`.
    pub async fn rename_session(
        &self,
        owner: &str,
        session_id: &str,
        title: &str,
    ) -> Result<(), TurnError> {
        let owner = require(owner, "email")?;
        let session_id = require(session_id, "sessionId")?;
        let title = require(title, "title")?;

        let id = parse_session_id(session_id)?;
        self.sessions.rename(&id, owner, title).await?;
        info!(session_id = %id, "Session renamed");
        Ok(())
    }

    /// Delete a session owned by `owner` together with all its messages.
    ///
    /// Messages go first, so a failure part-way never leaves a session
    /// without its history.
    pub async fn delete_session(&self, owner: &str, session_id: &str) -> Result<(), TurnError> {
        let owner = require(owner, "email")?;
        let session_id = require(session_id, "sessionId")?;

        let id = parse_session_id(session_id)?;
        if self.sessions.get_owned(&id, owner).await?.is_none() {
            return Err(TurnError::NotFound);
        }

        let removed = self.history.delete_all(&id).await?;
        self.sessions.delete(&id, owner).await?;
        info!(session_id = %id, messages = removed, "Session deleted");
        Ok(())
    }
}
