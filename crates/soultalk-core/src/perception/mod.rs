//! Emotion classification and speech-to-text ports.
//!
//! The models behind these traits run out of process. Implementations live
//! in soultalk-infra (`HttpTextEmotionClassifier` and friends); tests use
//! scripted mocks.

use std::path::Path;

use soultalk_types::error::CollaboratorError;

/// Single-label emotion classifier over free text.
pub trait TextEmotionClassifier: Send + Sync {
    /// Best label for `text`, uppercased (e.g. `"SADNESS"`).
    fn classify(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, CollaboratorError>> + Send;
}

/// Emotion prediction from a stored recording.
pub trait AudioEmotionClassifier: Send + Sync {
    /// Best label for the recording, uppercased, or
    /// [`soultalk_types::chat::UNCLEAR_EMOTION`] when the audio is too poor
    /// to analyze.
    fn classify(
        &self,
        audio_path: &Path,
    ) -> impl std::future::Future<Output = Result<String, CollaboratorError>> + Send;
}

/// Speech-to-text for a stored recording.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        audio_path: &Path,
    ) -> impl std::future::Future<Output = Result<String, CollaboratorError>> + Send;
}
