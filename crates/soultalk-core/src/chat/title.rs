//! Session title derivation.
//!
//! `TitleDeriver::derive` turns the first utterance of a session into a short
//! label. The text is cleaned locally, then summarized by the LLM; when the
//! call fails, times out, or returns nothing, the first three cleaned words
//! are used instead. Deriving a title never fails a turn.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use soultalk_types::llm::CompletionRequest;
use tracing::warn;

use crate::llm::box_provider::BoxLlmProvider;

/// Greeting and filler tokens removed before summarization.
const STOPWORDS: &[&str] = &["heyy", "hello", "hi", "hey", "soultalk", "today", "message"];

/// Pronouns stripped from the end of the cleaned text.
const TRAILING_PRONOUNS: &[&str] = &["me", "my", "i"];

/// Prepositions dropped when a pronoun after them was stripped ("... for me").
const DANGLING_PREPOSITIONS: &[&str] = &["for", "to", "with", "about", "of"];

/// Title used when the utterance has no meaningful words at all.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Upper bound on one summarization call unless configured otherwise.
pub const DEFAULT_TITLE_TIMEOUT: Duration = Duration::from_secs(10);

static STOPWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", STOPWORDS.join("|"))).expect("static stopword regex")
});

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static punctuation regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace regex"));

/// Clean raw user text for titling.
///
/// Lower-cases, drops stopwords on word boundaries, strips punctuation,
/// collapses whitespace, and removes trailing pronouns.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_stopwords = STOPWORD_RE.replace_all(&lowered, "");
    let without_punctuation = PUNCTUATION_RE.replace_all(&without_stopwords, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_punctuation, " ");

    let mut words: Vec<&str> = collapsed.split_whitespace().collect();
    let mut stripped_pronoun = false;
    while let Some(last) = words.last() {
        if TRAILING_PRONOUNS.contains(last) {
            words.pop();
            stripped_pronoun = true;
        } else if stripped_pronoun && DANGLING_PREPOSITIONS.contains(last) {
            words.pop();
            stripped_pronoun = false;
        } else {
            break;
        }
    }

    words.join(" ")
}

/// Deterministic local title: the first three cleaned words, title-cased.
pub fn fallback_title(clean_text: &str) -> String {
    let words: Vec<String> = clean_text
        .split_whitespace()
        .take(3)
        .map(capitalize)
        .collect();

    if words.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Strip whitespace and surrounding quote characters from a model answer.
fn clean_model_title(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
        .to_string()
}

fn title_prompt(clean_text: &str) -> String {
    format!(
        r#"You are an assistant that generates a short, simple, meaningful title (3-4 words)
for the following user message.

Instructions:
- Ignore pronouns like I, me, you, he, she, we, they.
- Ignore greetings like hi, hello, heyy.
- Ignore generic words like today, message, soultalk.
- Use plain, everyday English.
- Summarize the main idea or feeling of the message.
- Do not add unnecessary words.

User text:
{clean_text}

Title (main idea or feeling only):"#
    )
}

/// Best-effort remote summarization with a deterministic local fallback.
pub struct TitleDeriver {
    provider: Arc<BoxLlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl TitleDeriver {
    pub fn new(provider: Arc<BoxLlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.5,
            max_tokens: 20,
            timeout: DEFAULT_TITLE_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Derive a session title from raw user text. Never fails.
    #[tracing::instrument(name = "derive_title", skip(self, raw_text), fields(model = %self.model))]
    pub async fn derive(&self, raw_text: &str) -> String {
        let clean_text = preprocess(raw_text);
        let request = CompletionRequest::prompt(
            &self.model,
            title_prompt(&clean_text),
            self.temperature,
            self.max_tokens,
        );

        match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(Ok(response)) => {
                let title = clean_model_title(&response.content);
                if title.is_empty() {
                    warn!("Title model returned an empty title, using fallback");
                    fallback_title(&clean_text)
                } else {
                    title
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Title generation failed, using fallback");
                fallback_title(&clean_text)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Title generation timed out, using fallback"
                );
                fallback_title(&clean_text)
            }
        }
    }
}
