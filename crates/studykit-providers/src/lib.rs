//! studykit-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini, Anthropic and OpenAI,
//! each sending the study document as an inline PDF, plus an offline mock.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, StudykitConfig};
pub use error::ProviderError;
