//! Local filesystem audio store.
//!
//! Implements `AudioStore` from `soultalk-core`. Every upload gets a fresh
//! `<uuid>.wav` name and is opened with `create_new`, so an existing
//! recording is never overwritten.
//!
//! Layout:
//! ```text
//! {data_dir}/uploads/audio/
//!   0192f1c2a4b87c3e9d1f5a6b7c8d9e0f.wav
//! ```

use std::path::{Path, PathBuf};

use soultalk_core::storage::audio_store::{AudioStore, StoredAudio};
use soultalk_types::error::CollaboratorError;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// URL prefix under which stored recordings are served.
pub const AUDIO_URL_PREFIX: &str = "/uploads/audio";

/// Audio store writing into a single directory.
#[derive(Debug, Clone)]
pub struct LocalAudioStore {
    root: PathBuf,
}

impl LocalAudioStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The conventional location: `{data_dir}/uploads/audio`.
    pub fn audio_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("uploads").join("audio")
    }
}

impl AudioStore for LocalAudioStore {
    async fn store(&self, bytes: &[u8]) -> Result<StoredAudio, CollaboratorError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CollaboratorError::Storage(format!("{}: {e}", self.root.display())))?;

        let name = format!("{}.wav", Uuid::now_v7().simple());
        let path = self.root.join(&name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| CollaboratorError::Storage(format!("{}: {e}", path.display())))?;
        file.write_all(bytes)
            .await
            .map_err(|e| CollaboratorError::Storage(format!("{}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| CollaboratorError::Storage(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Audio stored");

        Ok(StoredAudio {
            path,
            public_ref: format!("{AUDIO_URL_PREFIX}/{name}"),
        })
    }
}
