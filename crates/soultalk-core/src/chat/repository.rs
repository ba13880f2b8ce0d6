//! Session registry and history store trait definitions.
//!
//! Follows the RPITIT pattern used for every repository port. The set-once
//! operations must be atomic at the storage layer: two concurrent first
//! turns may both observe an unset field, but only one write may land.

use soultalk_types::chat::{Message, ReplyTurn, Session};
use soultalk_types::error::RepositoryError;
use uuid::Uuid;

/// Per-(owner, session) records with lazily assigned title and emotion.
///
/// Implementations live in soultalk-infra (e.g., `SqliteSessionRepository`).
pub trait SessionRegistry: Send + Sync {
    /// Insert a new session.
    fn create(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Get a session by ID regardless of owner.
    fn get(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Get a session only if it belongs to `owner`.
    fn get_owned(
        &self,
        session_id: &Uuid,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// List sessions for an owner, ordered by created_at DESC.
    fn list(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Set the title only if it is currently unset. Returns whether it changed.
    fn set_title_if_unset(
        &self,
        session_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Pin the baseline emotion only if it is currently unset.
    ///
    /// Returns the emotion stored after the call (the caller's value, or the
    /// one a concurrent turn pinned first) and whether this call set it.
    fn pin_emotion_if_unset(
        &self,
        session_id: &Uuid,
        emotion: &str,
    ) -> impl std::future::Future<Output = Result<(String, bool), RepositoryError>> + Send;

    /// Overwrite the title. `NotFound` unless (session_id, owner) matches.
    fn rename(
        &self,
        session_id: &Uuid,
        owner: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the session record. `NotFound` unless (session_id, owner) matches.
    ///
    /// Messages are not touched; callers clear the history first.
    fn delete(
        &self,
        session_id: &Uuid,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Append-only, per-session ordered message log.
pub trait HistoryStore: Send + Sync {
    /// Append a message.
    fn append(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The user/bot text pairs of a session, oldest first.
    fn list_for_reply(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ReplyTurn>, RepositoryError>> + Send;

    /// Full message records of a session, oldest first.
    fn list_full(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Remove every message of a session. Returns how many were removed.
    fn delete_all(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Number of messages stored for a session.
    fn count(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;
}
