//! Audio store trait.
//!
//! Recordings are written once under a freshly generated unique name and
//! never overwritten. Implementations live in soultalk-infra.

use std::path::PathBuf;

use soultalk_types::error::CollaboratorError;

/// Location of a stored recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAudio {
    /// Absolute path handed to the classifier and the transcriber.
    pub path: PathBuf,
    /// Public reference persisted on the message (e.g. `/uploads/audio/<name>.wav`).
    pub public_ref: String,
}

/// Write-once blob store for uploaded audio.
pub trait AudioStore: Send + Sync {
    /// Persist `bytes` under a new unique name.
    fn store(
        &self,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<StoredAudio, CollaboratorError>> + Send;
}
