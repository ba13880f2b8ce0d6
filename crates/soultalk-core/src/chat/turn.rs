//! Per-turn state machine for text and voice messages.
//!
//! Each turn runs in a fixed order: session lookup, title resolution,
//! emotion resolution, history read, reply generation, and finally
//! persistence. The orchestrator keeps no state between calls; every
//! set-once decision is delegated to the registry's atomic operations.

use std::sync::Arc;

use soultalk_types::chat::{
    Message, ReplyTurn, Session, TextTurnOutcome, UNCLEAR_EMOTION, UNCLEAR_VOICE_PLACEHOLDER,
    UNCLEAR_VOICE_WARNING, VoiceTurnOutcome,
};
use soultalk_types::error::TurnError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::repository::{HistoryStore, SessionRegistry};
use crate::chat::reply::ReplyGenerator;
use crate::chat::title::TitleDeriver;
use crate::perception::{AudioEmotionClassifier, TextEmotionClassifier, Transcriber};
use crate::storage::audio_store::AudioStore;

/// Parse a caller-supplied session ID. Malformed IDs cannot match any
/// session, so they are reported as not found.
pub fn parse_session_id(raw: &str) -> Result<Uuid, TurnError> {
    Uuid::parse_str(raw.trim()).map_err(|_| TurnError::NotFound)
}

fn require(value: &str, field: &str) -> Result<(), TurnError> {
    if value.trim().is_empty() {
        Err(TurnError::InvalidInput(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Runs text and voice turns against the stores and collaborators.
///
/// Generic over every port so soultalk-core never depends on
/// soultalk-infra. Shared by all request handlers through an `Arc`.
pub struct TurnOrchestrator<S, H, T, A, X, B>
where
    S: SessionRegistry,
    H: HistoryStore,
    T: TextEmotionClassifier,
    A: AudioEmotionClassifier,
    X: Transcriber,
    B: AudioStore,
{
    sessions: Arc<S>,
    history: Arc<H>,
    text_classifier: T,
    audio_classifier: A,
    transcriber: X,
    audio_store: B,
    titles: TitleDeriver,
    replies: ReplyGenerator,
}

impl<S, H, T, A, X, B> TurnOrchestrator<S, H, T, A, X, B>
where
    S: SessionRegistry,
    H: HistoryStore,
    T: TextEmotionClassifier,
    A: AudioEmotionClassifier,
    X: Transcriber,
    B: AudioStore,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<S>,
        history: Arc<H>,
        text_classifier: T,
        audio_classifier: A,
        transcriber: X,
        audio_store: B,
        titles: TitleDeriver,
        replies: ReplyGenerator,
    ) -> Self {
        Self {
            sessions,
            history,
            text_classifier,
            audio_classifier,
            transcriber,
            audio_store,
            titles,
            replies,
        }
    }

    async fn lookup(&self, session_id: &str) -> Result<Session, TurnError> {
        let id = parse_session_id(session_id)?;
        self.sessions.get(&id).await?.ok_or(TurnError::NotFound)
    }

    /// Derive and assign the title if the session has none yet.
    ///
    /// Returns whether this turn's write landed.
    async fn resolve_title(&self, session: &Session, source_text: &str) -> Result<bool, TurnError> {
        if session.title.is_some() {
            return Ok(false);
        }
        let title = self.titles.derive(source_text).await;
        let changed = self.sessions.set_title_if_unset(&session.id, &title).await?;
        if changed {
            info!(session_id = %session.id, title = %title, "Session title assigned");
        } else {
            debug!(session_id = %session.id, "Title already assigned by a concurrent turn");
        }
        Ok(changed)
    }

    /// Generate a reply for `user_message` on top of the stored history.
    async fn reply_to(
        &self,
        session_id: &Uuid,
        user_message: &str,
        emotion: &str,
    ) -> Result<String, TurnError> {
        let mut history = self.history.list_for_reply(session_id).await?;
        history.push(ReplyTurn::pending(user_message));
        Ok(self.replies.generate(&history, Some(emotion)).await?)
    }

    /// Handle a typed message.
    ///
    /// The reply tone comes from the session's baseline emotion, which is
    /// classified and pinned on the first turn only.
    #[tracing::instrument(
        name = "text_turn",
        skip(self, owner, session_id, text),
        fields(session_id = %session_id)
    )]
    pub async fn text_turn(
        &self,
        owner: &str,
        session_id: &str,
        text: &str,
    ) -> Result<TextTurnOutcome, TurnError> {
        require(text, "message")?;
        require(owner, "email")?;
        require(session_id, "sessionId")?;
        let text = text.trim();

        let session = self.lookup(session_id).await?;
        let title_changed = self.resolve_title(&session, text).await?;

        let emotion = match &session.emotion {
            Some(pinned) => pinned.clone(),
            None => {
                let label = self.text_classifier.classify(text).await?;
                let (resolved, pinned) = self
                    .sessions
                    .pin_emotion_if_unset(&session.id, &label)
                    .await?;
                if pinned {
                    info!(session_id = %session.id, emotion = %resolved, "Baseline emotion pinned");
                }
                resolved
            }
        };

        let reply = self.reply_to(&session.id, text, &emotion).await?;

        let message = Message::new(session.id, owner, text, reply.as_str()).with_emotion(&emotion);
        self.history.append(&message).await?;

        Ok(TextTurnOutcome {
            reply,
            emotion,
            title_changed,
        })
    }

    /// Handle a recorded voice message.
    ///
    /// Unclear recordings are stored with a placeholder and a fixed warning
    /// without touching the session. Clear ones are transcribed and answered
    /// in the tone predicted from this recording.
    #[tracing::instrument(
        name = "voice_turn",
        skip(self, owner, session_id, audio),
        fields(session_id = %session_id, audio_bytes = audio.len())
    )]
    pub async fn voice_turn(
        &self,
        owner: &str,
        session_id: &str,
        audio: &[u8],
    ) -> Result<VoiceTurnOutcome, TurnError> {
        if audio.is_empty() {
            return Err(TurnError::InvalidInput("audio file is required".to_string()));
        }
        require(owner, "email")?;
        require(session_id, "sessionId")?;

        let session = self.lookup(session_id).await?;
        let stored = self.audio_store.store(audio).await?;
        let emotion = self.audio_classifier.classify(&stored.path).await?;

        if emotion == UNCLEAR_EMOTION {
            info!(session_id = %session.id, "Voice message rejected as unclear");
            let message = Message::new(
                session.id,
                owner,
                UNCLEAR_VOICE_PLACEHOLDER,
                UNCLEAR_VOICE_WARNING,
            )
            .with_emotion(UNCLEAR_EMOTION)
            .with_audio_ref(&stored.public_ref);
            self.history.append(&message).await?;

            return Ok(VoiceTurnOutcome {
                reply: UNCLEAR_VOICE_WARNING.to_string(),
                emotion,
                transcription: String::new(),
                audio_ref: stored.public_ref,
                title_changed: false,
            });
        }

        let transcription = self.transcriber.transcribe(&stored.path).await?;
        let title_changed = self.resolve_title(&session, &transcription).await?;
        let reply = self.reply_to(&session.id, &transcription, &emotion).await?;

        let message = Message::new(session.id, owner, transcription.as_str(), reply.as_str())
            .with_emotion(&emotion)
            .with_audio_ref(&stored.public_ref);
        self.history.append(&message).await?;

        Ok(VoiceTurnOutcome {
            reply,
            emotion,
            transcription,
            audio_ref: stored.public_ref,
            title_changed,
        })
    }
}
