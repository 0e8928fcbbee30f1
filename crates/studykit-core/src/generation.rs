//! Document-to-content generation.
//!
//! One request per call: the provider is asked once, its answer is parsed
//! and validated, and any failure is returned to the caller as is. The
//! user decides whether to try again.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::document::PdfDocument;
use crate::error::GenerationError;
use crate::model::{ContentKind, NormalizedContent};
use crate::prompts::{system_prompt, user_prompt};
use crate::traits::{GenerateRequest, LlmProvider};
use crate::validator::ContentValidator;

/// Settings for generation requests.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Temperature for generation.
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro-latest".to_string(),
            max_tokens: 8192,
            temperature: 0.2,
        }
    }
}

/// Joins a provider to the content validator.
pub struct ContentGenerator {
    provider: Arc<dyn LlmProvider>,
    validator: ContentValidator,
    config: GenerationConfig,
}

impl ContentGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        validator: ContentValidator,
        config: GenerationConfig,
    ) -> Self {
        Self {
            provider,
            validator,
            config,
        }
    }

    /// Build the provider request for `kind`.
    pub fn request_for(&self, document: &PdfDocument, kind: ContentKind) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt: user_prompt(kind),
            system_prompt: Some(system_prompt(kind, self.validator.config().min_flashcards)),
            document: Some(document.clone()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Generate and validate content of `kind` from `document`.
    pub async fn generate(
        &self,
        document: &PdfDocument,
        kind: ContentKind,
    ) -> Result<NormalizedContent, GenerationError> {
        let request_id = Uuid::new_v4();
        let start = Instant::now();
        tracing::info!(
            %request_id,
            provider = self.provider.name(),
            model = %self.config.model,
            %kind,
            file = %document.file_name,
            "starting content generation"
        );

        let request = self.request_for(document, kind);
        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(GenerationError::GenerationFailure)?;

        if response.content.trim().is_empty() {
            tracing::warn!(%request_id, "provider returned an empty response");
            return Err(GenerationError::GenerationFailure(anyhow::anyhow!(
                "no response generated"
            )));
        }

        match self.validator.validate_text(kind, &response.content) {
            Ok(content) => {
                tracing::info!(
                    %request_id,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    tokens = response.token_usage.total_tokens,
                    "generated content passed validation"
                );
                Ok(content)
            }
            Err(e) => {
                tracing::warn!(%request_id, "rejected generated content: {e}");
                Err(e.into())
            }
        }
    }
}
