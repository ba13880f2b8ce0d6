use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in soultalk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the emotion classifiers, the transcriber, and the audio store.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service} request failed: {message}")]
    Request { service: String, message: String },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be parsed: {message}")]
    Response { service: String, message: String },

    #[error("audio storage error: {0}")]
    Storage(String),
}

/// Errors surfaced by a conversation turn or a session operation.
///
/// The HTTP layer maps `InvalidInput` to 400, `NotFound` to 404, and the
/// rest to a generic 500.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown session, or one that belongs to another owner.
    #[error("session not found")]
    NotFound,

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("storage failure: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for TurnError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => TurnError::NotFound,
            other => TurnError::Storage(other),
        }
    }
}

impl From<LlmError> for TurnError {
    fn from(e: LlmError) -> Self {
        TurnError::Upstream(e.to_string())
    }
}

impl From<CollaboratorError> for TurnError {
    fn from(e: CollaboratorError) -> Self {
        match e {
            CollaboratorError::Storage(msg) => {
                TurnError::Storage(RepositoryError::Query(msg))
            }
            other => TurnError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_repository_not_found_folds_into_turn_not_found() {
        let err: TurnError = RepositoryError::NotFound.into();
        assert!(matches!(err, TurnError::NotFound));
    }

    #[test]
    fn test_llm_error_becomes_upstream() {
        let err: TurnError = LlmError::AuthenticationFailed.into();
        assert!(matches!(err, TurnError::Upstream(_)));
    }

    #[test]
    fn test_collaborator_status_display() {
        let err = CollaboratorError::Status {
            service: "transcriber".to_string(),
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "transcriber returned HTTP 503: busy");
    }

    #[test]
    fn test_audio_storage_error_is_storage_failure() {
        let err: TurnError = CollaboratorError::Storage("disk full".to_string()).into();
        assert!(matches!(err, TurnError::Storage(_)));
    }
}
