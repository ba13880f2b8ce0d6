//! Configuration for the OpenAI-compatible chat provider.
//!
//! Cohere's compatibility endpoint is the default; any service speaking the
//! OpenAI chat completions protocol works by changing the base URL.

use secrecy::SecretString;
use soultalk_types::config::LlmConfig;

/// Environment variables searched for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["SOULTALK_LLM_API_KEY", "COHERE_API_KEY", "OPENAI_API_KEY"];

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "cohere", "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.cohere.ai/compatibility/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model used when a request does not name one.
    pub model: String,
}

impl OpenAiCompatConfig {
    /// Build from the `[llm]` section of `config.toml` and a resolved key.
    pub fn from_llm_config(llm: &LlmConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: llm.provider_name.clone(),
            base_url: llm.base_url.clone(),
            api_key,
            model: llm.model.clone(),
        }
    }
}

/// Look up the API key from the environment.
///
/// Returns `None` when none of [`API_KEY_ENV_VARS`] holds a non-empty value.
pub fn api_key_from_env() -> Option<SecretString> {
    API_KEY_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretString::from(value.trim().to_string()))
    })
}
