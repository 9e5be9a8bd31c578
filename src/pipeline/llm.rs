//! Section generation through a hosted LLM.
//!
//! One prompt in, one completion out: no streaming, no tools, no retries.
//! A failed call fails the whole request.

use crate::config::ServiceConfig;
use crate::error::Pdf2DocxError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Single-shot text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2DocxError>;
}

/// [`TextGenerator`] backed by an `edgequake_llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }

    /// Create the provider named in the configuration.
    ///
    /// The provider reads its API key from the environment (for Gemini,
    /// `GEMINI_API_KEY`).
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Pdf2DocxError> {
        let provider = ProviderFactory::create_llm_provider(&config.provider_name, &config.model)
            .map_err(|e| {
                Pdf2DocxError::InvalidConfig(format!(
                    "LLM provider '{}' is not configured: {}",
                    config.provider_name, e
                ))
            })?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2DocxError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| Pdf2DocxError::GenerationFailed {
                section: String::new(),
                detail: e.to_string(),
            })?;

        debug!(
            "Generated {} chars: {} input tokens, {} output tokens, {:?}",
            response.content.len(),
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the service config.
fn build_options(config: &ServiceConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
