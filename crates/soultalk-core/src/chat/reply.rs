//! Empathetic reply generation.
//!
//! Builds a single prompt from the session transcript and the resolved
//! emotion, then asks the chat model for the next SoulTalk reply.

use std::sync::Arc;

use soultalk_types::chat::ReplyTurn;
use soultalk_types::llm::{CompletionRequest, LlmError};

use crate::llm::box_provider::BoxLlmProvider;

/// Name the assistant speaks as in prompts and transcripts.
const ASSISTANT_NAME: &str = "SoulTalk";

/// Render the reply prompt.
///
/// `history` must end with the current turn (its reply empty); every earlier
/// turn is rendered into the transcript.
pub fn build_reply_prompt(history: &[ReplyTurn], emotion: Option<&str>) -> String {
    let (latest, earlier) = match history.split_last() {
        Some((latest, earlier)) => (latest.user_message.as_str(), earlier),
        None => ("", history),
    };

    let chat_log = earlier
        .iter()
        .map(|turn| {
            format!(
                "User: {}\n{ASSISTANT_NAME}: {}",
                turn.user_message, turn.bot_reply
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let emotion = emotion
        .map(str::to_lowercase)
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        r#"You are {ASSISTANT_NAME}, an empathetic and supportive AI companion.
The user is feeling {emotion}.

Your role is to gently respond based on the full conversation. Keep the tone supportive and friendly.

Instructions:
- Give the answers in proper structure.
- Don't make the response very big, keep it crisp and concise.
- Use emojis if needed.
- Stay emotionally in tune with the user.
- Never repeat previous responses.
- Avoid generic filler like "I'm sorry you feel that way".

Here is the chat history:
{chat_log}
User: {latest}
{ASSISTANT_NAME}:"#
    )
}

/// Generates replies through the shared chat-completion provider.
pub struct ReplyGenerator {
    provider: Arc<BoxLlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ReplyGenerator {
    pub fn new(provider: Arc<BoxLlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.6,
            max_tokens: 512,
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

    /// Generate the reply for the last turn of `history`.
    ///
    /// Provider failures and empty completions are returned as errors.
    #[tracing::instrument(
        name = "generate_reply",
        skip(self, history),
        fields(model = %self.model, turns = history.len())
    )]
    pub async fn generate(
        &self,
        history: &[ReplyTurn],
        emotion: Option<&str>,
    ) -> Result<String, LlmError> {
        if history.is_empty() {
            return Err(LlmError::InvalidRequest(
                "reply history must contain the current turn".to_string(),
            ));
        }

        let prompt = build_reply_prompt(history, emotion);
        let request = CompletionRequest::prompt(
            &self.model,
            prompt.trim(),
            self.temperature,
            self.max_tokens,
        );

        let response = self.provider.complete(&request).await?;
        let reply = response.content.trim().to_string();
        if reply.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        tracing::debug!(provider = self.provider.name(), chars = reply.len(), "Reply generated");
        Ok(reply)
    }
}
