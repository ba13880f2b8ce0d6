//! Conversation turn HTTP handlers.
//!
//! Endpoints:
//! - POST /api/message       - Text turn: `{email, sessionId, message}`
//! - POST /api/voice-message - Voice turn: multipart `file`, `email`, `sessionId`

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};

use soultalk_types::chat::{TextTurnOutcome, VoiceTurnOutcome};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageResponse {
    pub reply: String,
    pub emotion: String,
    pub title_changed: bool,
}

impl From<TextTurnOutcome> for TextMessageResponse {
    fn from(outcome: TextTurnOutcome) -> Self {
        Self {
            reply: outcome.reply,
            emotion: outcome.emotion,
            title_changed: outcome.title_changed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessageResponse {
    pub reply: String,
    pub emotion: String,
    pub transcription: String,
    pub audio_file: String,
    pub title_changed: bool,
}

impl From<VoiceTurnOutcome> for VoiceMessageResponse {
    fn from(outcome: VoiceTurnOutcome) -> Self {
        Self {
            reply: outcome.reply,
            emotion: outcome.emotion,
            transcription: outcome.transcription,
            audio_file: outcome.audio_ref,
            title_changed: outcome.title_changed,
        }
    }
}

/// POST /api/message - Run a text turn.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<TextMessageRequest>, JsonRejection>,
) -> Result<Json<TextMessageResponse>, AppError> {
    let Json(body) = payload?;
    let outcome = state
        .turns
        .text_turn(&body.email, &body.session_id, &body.message)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /api/voice-message - Run a voice turn from a multipart upload.
///
/// A recording rejected as unclear is still a 200 with the warning reply.
pub async fn send_voice_message(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VoiceMessageResponse>, AppError> {
    let mut audio = Vec::new();
    let mut email = String::new();
    let mut session_id = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => audio = field.bytes().await?.to_vec(),
            "email" => email = field.text().await?,
            "sessionId" => session_id = field.text().await?,
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let outcome = state
        .turns
        .voice_turn(&email, &session_id, &audio)
        .await?;

    if outcome.is_unclear() {
        tracing::info!(session_id = %session_id, "Voice message rejected as unclear");
    }
    Ok(Json(outcome.into()))
}
