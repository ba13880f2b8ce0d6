//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](soultalk_core::llm::provider::LlmProvider)
//! used for reply and title generation, plus a factory ([`create_provider`])
//! that builds it from the `[llm]` config section and a connection check
//! ([`test_provider_connection`]).

pub mod openai_compat;

use secrecy::SecretString;

use soultalk_core::llm::box_provider::BoxLlmProvider;
use soultalk_types::config::LlmConfig;
use soultalk_types::llm::{CompletionRequest, LlmError};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the `[llm]` config section.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when no API key was resolved.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_llm_config(config, key));
    Ok(BoxLlmProvider::new(provider))
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Sends a tiny "Hello" message with minimal token budget.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    // Empty model: the provider uses its configured default
    let request = CompletionRequest::prompt("", "Hello", 0.0, 10);
    provider.complete(&request).await?;
    Ok(())
}
