//! Global configuration types for SoulTalk.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default so an empty or missing file works.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the SoulTalk backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub perception: PerceptionConfig,
}

/// Chat-completion settings shared by reply and title generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name shown in logs.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_reply_temperature")]
    pub reply_temperature: f64,
    #[serde(default = "default_title_temperature")]
    pub title_temperature: f64,
    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: u32,
    #[serde(default = "default_title_max_tokens")]
    pub title_max_tokens: u32,
    /// Upper bound on one title summarization call, in seconds.
    #[serde(default = "default_title_timeout_secs")]
    pub title_timeout_secs: u64,
}

fn default_provider_name() -> String {
    "cohere".to_string()
}

fn default_base_url() -> String {
    "https://api.cohere.ai/compatibility/v1".to_string()
}

fn default_model() -> String {
    "command-r-plus".to_string()
}

fn default_reply_temperature() -> f64 {
    0.6
}

fn default_title_temperature() -> f64 {
    0.5
}

fn default_reply_max_tokens() -> u32 {
    512
}

fn default_title_max_tokens() -> u32 {
    20
}

fn default_title_timeout_secs() -> u64 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            reply_temperature: default_reply_temperature(),
            title_temperature: default_title_temperature(),
            reply_max_tokens: default_reply_max_tokens(),
            title_max_tokens: default_title_max_tokens(),
            title_timeout_secs: default_title_timeout_secs(),
        }
    }
}

/// Endpoints of the emotion classifiers and the speech-to-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionConfig {
    #[serde(default = "default_text_emotion_url")]
    pub text_emotion_url: String,
    #[serde(default = "default_audio_emotion_url")]
    pub audio_emotion_url: String,
    #[serde(default = "default_transcribe_url")]
    pub transcribe_url: String,
    /// Per-request timeout for all three services, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_text_emotion_url() -> String {
    "http://127.0.0.1:9000/emotion/text".to_string()
}

fn default_audio_emotion_url() -> String {
    "http://127.0.0.1:9000/emotion/audio".to_string()
}

fn default_transcribe_url() -> String {
    "http://127.0.0.1:9000/transcribe".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            text_emotion_url: default_text_emotion_url(),
            audio_emotion_url: default_audio_emotion_url(),
            transcribe_url: default_transcribe_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
