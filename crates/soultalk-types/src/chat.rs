//! Chat session, message, and turn outcome types for SoulTalk.
//!
//! A session belongs to one owner (an opaque email string) and carries two
//! set-once fields: the auto-derived `title` and the pinned baseline
//! `emotion`. Messages are append-only and ordered by `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emotion label returned by the audio classifier when the recording is too
/// poor to analyze.
pub const UNCLEAR_EMOTION: &str = "UNCLEAR";

/// `user_message` stored for a rejected voice turn.
pub const UNCLEAR_VOICE_PLACEHOLDER: &str = "[Unclear voice message]";

/// Fixed reply for a rejected voice turn.
pub const UNCLEAR_VOICE_WARNING: &str = "⚠ Voice message not clear, please try again.";

/// A chat session owned by a single caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Caller-supplied identity used as the partition key.
    pub owner: String,
    /// Short label. Set once automatically on the first turn, afterwards
    /// changed only by an explicit rename.
    pub title: Option<String>,
    /// Baseline emotion pinned from the first classified text turn.
    pub emotion: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Build a fresh session with both set-once fields unset.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner: owner.into(),
            title: None,
            emotion: None,
            created_at: Utc::now(),
        }
    }
}

/// One stored exchange: what the user said and what the bot replied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub owner: String,
    /// Text typed by the user, the transcription of a voice turn, or
    /// [`UNCLEAR_VOICE_PLACEHOLDER`].
    pub user_message: String,
    /// Public reference to the stored recording (voice turns only).
    pub audio_ref: Option<String>,
    /// Label attached to this turn. May differ from the session baseline.
    pub emotion: Option<String>,
    /// Reserved; no classifier currently reports it.
    pub confidence: Option<f64>,
    pub bot_reply: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(
        session_id: Uuid,
        owner: impl Into<String>,
        user_message: impl Into<String>,
        bot_reply: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            owner: owner.into(),
            user_message: user_message.into(),
            audio_ref: None,
            emotion: None,
            confidence: None,
            bot_reply: bot_reply.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn with_audio_ref(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into());
        self
    }
}

/// The two text fields of a message, used to build reply prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTurn {
    pub user_message: String,
    pub bot_reply: String,
}

impl ReplyTurn {
    /// A turn whose reply has not been generated yet.
    pub fn pending(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_reply: String::new(),
        }
    }
}

/// Result of a text turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTurnOutcome {
    pub reply: String,
    /// The session baseline the reply was generated with.
    pub emotion: String,
    /// True only for the turn that assigned the session title.
    pub title_changed: bool,
}

/// Result of a voice turn, including the UNCLEAR short-circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceTurnOutcome {
    pub reply: String,
    /// The label predicted from this recording.
    pub emotion: String,
    /// Empty when the recording was rejected as unclear.
    pub transcription: String,
    pub audio_ref: String,
    pub title_changed: bool,
}

impl VoiceTurnOutcome {
    /// Whether the audio quality gate rejected the recording.
    pub fn is_unclear(&self) -> bool {
        self.emotion == UNCLEAR_EMOTION
    }
}
