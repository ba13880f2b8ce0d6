//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST /api/session/new      - Create an empty session
//! - POST /api/session/list     - List an owner's sessions, newest first
//! - POST /api/session/messages - Full history of a session, oldest first
//! - POST /api/session/rename   - Overwrite the title of an owned session
//! - POST /api/session/delete   - Delete an owned session and its messages

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use soultalk_types::chat::{Message, Session};

use crate::http::error::AppError;
use crate::state::AppState;

/// Timestamp layout used in session and message listings.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub session_id: String,
}

/// A session as listed in the sidebar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub email: String,
    pub title: Option<String>,
    pub emotion: Option<String>,
    pub created_at: String,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id.to_string(),
            email: session.owner,
            title: session.title,
            emotion: session.emotion,
            created_at: session.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
}

/// A stored exchange. The text fields keep the names the chat client
/// renders (`user_message`, `bot_reply`, `audio_path`).
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub email: String,
    pub user_message: String,
    pub audio_path: Option<String>,
    pub emotion: Option<String>,
    pub confidence: Option<f64>,
    pub bot_reply: String,
    pub timestamp: String,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            session_id: message.session_id.to_string(),
            email: message.owner,
            user_message: message.user_message,
            audio_path: message.audio_ref,
            emotion: message.emotion,
            confidence: message.confidence,
            bot_reply: message.bot_reply,
            timestamp: message.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/session/new - Create an empty session for the caller.
pub async fn new_session(
    State(state): State<AppState>,
    payload: Result<Json<OwnerRequest>, JsonRejection>,
) -> Result<Json<NewSessionResponse>, AppError> {
    let Json(body) = payload?;
    let session = state.chat_service.create_session(&body.email).await?;
    Ok(Json(NewSessionResponse {
        session_id: session.id.to_string(),
    }))
}

/// POST /api/session/list - List the caller's sessions, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
    payload: Result<Json<OwnerRequest>, JsonRejection>,
) -> Result<Json<SessionListResponse>, AppError> {
    let Json(body) = payload?;
    let sessions = state.chat_service.list_sessions(&body.email).await?;
    Ok(Json(SessionListResponse {
        sessions: sessions.into_iter().map(SessionView::from).collect(),
    }))
}

/// POST /api/session/messages - Full history of a session, oldest first.
pub async fn session_messages(
    State(state): State<AppState>,
    payload: Result<Json<SessionIdRequest>, JsonRejection>,
) -> Result<Json<MessageListResponse>, AppError> {
    let Json(body) = payload?;
    let messages = state.chat_service.session_messages(&body.session_id).await?;
    Ok(Json(MessageListResponse {
        messages: messages.into_iter().map(MessageView::from).collect(),
    }))
}

/// POST /api/session/delete - Delete an owned session and all its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let Json(body) = payload?;
    state
        .chat_service
        .delete_session(&body.email, &body.session_id)
        .await?;
    Ok(Json(AckResponse {
        success: true,
        message: "Session deleted successfully",
    }))
}

/// POST /api/session/rename - Overwrite the title of an owned session.
pub async fn rename_session(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let Json(body) = payload?;
    state
        .chat_service
        .rename_session(&body.email, &body.session_id, &body.title)
        .await?;
    Ok(Json(AckResponse {
        success: true,
        message: "Session renamed successfully",
    }))
}
