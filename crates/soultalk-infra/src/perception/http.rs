//! reqwest-backed emotion classifiers and transcriber.
//!
//! - Text emotion: `POST {url}` with JSON `{"text": ...}`; the service answers
//!   either `{"label": ...}` or a list of `{"label", "score"}` candidates.
//! - Audio emotion: multipart `file` upload; answers `{"emotion": ...}`.
//! - Transcription: multipart `file` upload; answers `{"text": ...}`.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, multipart};
use serde::Deserialize;
use soultalk_core::perception::{AudioEmotionClassifier, TextEmotionClassifier, Transcriber};
use soultalk_types::error::CollaboratorError;

const TEXT_CLASSIFIER: &str = "text emotion classifier";
const AUDIO_CLASSIFIER: &str = "audio emotion classifier";
const TRANSCRIBER: &str = "transcriber";

/// Build the HTTP client shared by all perception services.
pub fn perception_client(timeout_secs: u64) -> Result<Client, CollaboratorError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CollaboratorError::Request {
            service: "perception".to_string(),
            message: e.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct ScoredLabel {
    label: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextEmotionResponse {
    Single { label: String },
    Scored(Vec<ScoredLabel>),
    Batched(Vec<Vec<ScoredLabel>>),
}

impl TextEmotionResponse {
    /// The highest-scoring label, uppercased.
    fn best_label(self) -> Option<String> {
        let candidates = match self {
            TextEmotionResponse::Single { label } => return Some(label.to_uppercase()),
            TextEmotionResponse::Scored(candidates) => candidates,
            TextEmotionResponse::Batched(batches) => batches.into_iter().next()?,
        };
        candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|c| c.label.to_uppercase())
    }
}

#[derive(Debug, Deserialize)]
struct AudioEmotionResponse {
    emotion: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

fn request_error(service: &str, e: reqwest::Error) -> CollaboratorError {
    CollaboratorError::Request {
        service: service.to_string(),
        message: e.to_string(),
    }
}

/// Check the status and decode the JSON body.
async fn read_json<T: for<'de> Deserialize<'de>>(
    service: &str,
    response: reqwest::Response,
) -> Result<T, CollaboratorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollaboratorError::Status {
            service: service.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CollaboratorError::Response {
            service: service.to_string(),
            message: e.to_string(),
        })
}

/// Multipart form with the recording under the `file` field.
async fn audio_form(service: &str, audio_path: &Path) -> Result<multipart::Form, CollaboratorError> {
    let bytes = tokio::fs::read(audio_path)
        .await
        .map_err(|e| CollaboratorError::Storage(format!("{}: {e}", audio_path.display())))?;

    let file_name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());

    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("audio/wav")
        .map_err(|e| request_error(service, e))?;

    Ok(multipart::Form::new().part("file", part))
}

/// Text emotion classifier behind an HTTP endpoint.
#[derive(Clone)]
pub struct HttpTextEmotionClassifier {
    client: Client,
    url: String,
}

impl HttpTextEmotionClassifier {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl TextEmotionClassifier for HttpTextEmotionClassifier {
    async fn classify(&self, text: &str) -> Result<String, CollaboratorError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| request_error(TEXT_CLASSIFIER, e))?;

        let parsed: TextEmotionResponse = read_json(TEXT_CLASSIFIER, response).await?;
        let label = parsed.best_label().ok_or_else(|| CollaboratorError::Response {
            service: TEXT_CLASSIFIER.to_string(),
            message: "no label in response".to_string(),
        })?;

        tracing::debug!(label = %label, "Text emotion classified");
        Ok(label)
    }
}

/// Audio emotion classifier behind an HTTP endpoint.
#[derive(Clone)]
pub struct HttpAudioEmotionClassifier {
    client: Client,
    url: String,
}

impl HttpAudioEmotionClassifier {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl AudioEmotionClassifier for HttpAudioEmotionClassifier {
    async fn classify(&self, audio_path: &Path) -> Result<String, CollaboratorError> {
        let form = audio_form(AUDIO_CLASSIFIER, audio_path).await?;
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(AUDIO_CLASSIFIER, e))?;

        let parsed: AudioEmotionResponse = read_json(AUDIO_CLASSIFIER, response).await?;
        let label = parsed.emotion.trim().to_uppercase();

        tracing::debug!(label = %label, "Audio emotion classified");
        Ok(label)
    }
}

/// Speech-to-text behind an HTTP endpoint.
#[derive(Clone)]
pub struct HttpTranscriber {
    client: Client,
    url: String,
}

impl HttpTranscriber {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, CollaboratorError> {
        let form = audio_form(TRANSCRIBER, audio_path).await?;
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(TRANSCRIBER, e))?;

        let parsed: TranscriptionResponse = read_json(TRANSCRIBER, response).await?;
        Ok(parsed.text.trim().to_string())
    }
}
