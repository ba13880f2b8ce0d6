//! Hand-written mock collaborators shared by the chat module tests.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use soultalk_types::chat::{Message, ReplyTurn, Session};
use soultalk_types::error::{CollaboratorError, RepositoryError};
use soultalk_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::chat::repository::{HistoryStore, SessionRegistry};
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::perception::{AudioEmotionClassifier, TextEmotionClassifier, Transcriber};
use crate::storage::audio_store::{AudioStore, StoredAudio};

/// Marker that only appears in title summarization prompts.
const TITLE_PROMPT_MARKER: &str = "Title (main idea";

// --- LLM ---

#[derive(Clone)]
enum MockAnswer {
    Text(String),
    Fail,
    Hang,
}

/// Scripted chat-completion provider recording every request.
///
/// Title prompts and reply prompts can be answered differently; clones share
/// the recorded requests.
#[derive(Clone)]
pub(crate) struct MockLlmProvider {
    reply: MockAnswer,
    title: Option<MockAnswer>,
    title_barrier: Option<Arc<Barrier>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: MockAnswer::Text(text.to_string()),
            title: None,
            title_barrier: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: MockAnswer::Fail,
            ..Self::replying("")
        }
    }

    /// Answer title prompts with `title` instead of the reply text.
    pub(crate) fn titling(mut self, title: &str) -> Self {
        self.title = Some(MockAnswer::Text(title.to_string()));
        self
    }

    /// Never resolve title prompts; replies still answer `"I hear you."`.
    pub(crate) fn hanging_titles() -> Self {
        Self {
            title: Some(MockAnswer::Hang),
            ..Self::replying("I hear you.")
        }
    }

    /// Fail reply prompts while still answering title prompts.
    pub(crate) fn failing_replies(mut self) -> Self {
        if self.title.is_none() {
            self.title = Some(self.reply.clone());
        }
        self.reply = MockAnswer::Fail;
        self
    }

    /// Park every title call on `barrier` before answering.
    pub(crate) fn with_title_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.title_barrier = Some(barrier);
        self
    }

    pub(crate) fn boxed(&self) -> BoxLlmProvider {
        BoxLlmProvider::new(self.clone())
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of calls that were not title prompts.
    pub(crate) fn reply_call_count(&self) -> usize {
        self.prompts()
            .iter()
            .filter(|p| !p.contains(TITLE_PROMPT_MARKER))
            .count()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                r.messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }

    pub(crate) fn temperatures(&self) -> Vec<Option<f64>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.temperature)
            .collect()
    }
}

impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let is_title = request
            .messages
            .iter()
            .any(|m| m.content.contains(TITLE_PROMPT_MARKER));
        self.requests.lock().unwrap().push(request.clone());

        let answer = match (&self.title, is_title) {
            (Some(title), true) => title.clone(),
            _ => self.reply.clone(),
        };
        let barrier = if is_title {
            self.title_barrier.clone()
        } else {
            None
        };
        let model = request.model.clone();

        async move {
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            match answer {
                MockAnswer::Text(content) => Ok(CompletionResponse {
                    id: "resp-mock".to_string(),
                    content,
                    model,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                MockAnswer::Fail => Err(LlmError::Provider {
                    message: "mock provider unavailable".to_string(),
                }),
                MockAnswer::Hang => std::future::pending().await,
            }
        }
    }
}

// --- Stores ---

/// In-memory session registry with the same set-once semantics as SQLite.
#[derive(Clone, Default)]
pub(crate) struct InMemorySessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl InMemorySessionRegistry {
    pub(crate) fn snapshot(&self, session_id: &Uuid) -> Option<Session> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    async fn create(&self, session: &Session) -> Result<Session, RepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        Ok(self.snapshot(session_id))
    }

    async fn get_owned(
        &self,
        session_id: &Uuid,
        owner: &str,
    ) -> Result<Option<Session>, RepositoryError> {
        Ok(self.snapshot(session_id).filter(|s| s.owner == owner))
    }

    async fn list(&self, owner: &str) -> Result<Vec<Session>, RepositoryError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn set_title_if_unset(
        &self,
        session_id: &Uuid,
        title: &str,
    ) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) if session.title.is_none() => {
                session.title = Some(title.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pin_emotion_if_unset(
        &self,
        session_id: &Uuid,
        emotion: &str,
    ) -> Result<(String, bool), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        match &session.emotion {
            Some(pinned) => Ok((pinned.clone(), false)),
            None => {
                session.emotion = Some(emotion.to_string());
                Ok((emotion.to_string(), true))
            }
        }
    }

    async fn rename(
        &self,
        session_id: &Uuid,
        owner: &str,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) if session.owner == owner => {
                session.title = Some(title.to_string());
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, session_id: &Uuid, owner: &str) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(session_id) {
            Some(session) if session.owner == owner => {
                sessions.remove(session_id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

/// In-memory append-only message log.
#[derive(Clone, Default)]
pub(crate) struct InMemoryHistory {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryHistory {
    pub(crate) fn all(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

impl HistoryStore for InMemoryHistory {
    async fn append(&self, message: &Message) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn list_for_reply(&self, session_id: &Uuid) -> Result<Vec<ReplyTurn>, RepositoryError> {
        Ok(self
            .list_full(session_id)
            .await?
            .into_iter()
            .map(|m| ReplyTurn {
                user_message: m.user_message,
                bot_reply: m.bot_reply,
            })
            .collect())
    }

    async fn list_full(&self, session_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn delete_all(&self, session_id: &Uuid) -> Result<u64, RepositoryError> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| &m.session_id != session_id);
        Ok((before - messages.len()) as u64)
    }

    async fn count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        Ok(self.list_full(session_id).await?.len() as u32)
    }
}

// --- Perception ---

/// Text classifier cycling through a fixed list of labels.
#[derive(Clone)]
pub(crate) struct MockTextClassifier {
    labels: Arc<Vec<String>>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTextClassifier {
    pub(crate) fn labels(labels: &[&str]) -> Self {
        Self {
            labels: Arc::new(labels.iter().map(|l| l.to_string()).collect()),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::labels(&["NEUTRAL"])
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEmotionClassifier for MockTextClassifier {
    async fn classify(&self, _text: &str) -> Result<String, CollaboratorError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CollaboratorError::Request {
                service: "text classifier".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.labels[n % self.labels.len()].clone())
    }
}

/// Audio classifier returning one fixed label.
#[derive(Clone)]
pub(crate) struct MockAudioClassifier {
    label: String,
    calls: Arc<AtomicUsize>,
}

impl MockAudioClassifier {
    pub(crate) fn label(label: &str) -> Self {
        Self {
            label: label.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AudioEmotionClassifier for MockAudioClassifier {
    async fn classify(&self, _audio_path: &Path) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label.clone())
    }
}

/// Transcriber returning one fixed text.
#[derive(Clone)]
pub(crate) struct MockTranscriber {
    text: String,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    pub(crate) fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

// --- Audio storage ---

/// Audio store that only records sizes and hands out numbered names.
#[derive(Clone, Default)]
pub(crate) struct MockAudioStore {
    stored: Arc<Mutex<Vec<usize>>>,
}

impl MockAudioStore {
    pub(crate) fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

impl AudioStore for MockAudioStore {
    async fn store(&self, bytes: &[u8]) -> Result<StoredAudio, CollaboratorError> {
        let mut stored = self.stored.lock().unwrap();
        stored.push(bytes.len());
        let name = format!("clip-{}.wav", stored.len());
        Ok(StoredAudio {
            path: PathBuf::from("/tmp/soultalk-test").join(&name),
            public_ref: format!("/uploads/audio/{name}"),
        })
    }
}
