//! Configuration loading and the provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studykit_core::generation::GenerationConfig;
use studykit_core::traits::LlmProvider;
use studykit_core::validator::ValidatorConfig;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    /// Offline provider returning sample content.
    Mock,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock => f.write_str("Mock"),
        }
    }
}

/// Top-level studykit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudykitConfig {
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Max tokens per generation request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Fewest flashcards a generated deck may hold.
    #[serde(default = "default_min_flashcards")]
    pub min_flashcards: usize,
    /// Directory holding the persisted study state.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-pro-latest".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_max_tokens() -> u32 {
    8192
}
fn default_min_flashcards() -> usize {
    ValidatorConfig::default().min_flashcards
}
fn default_state_dir() -> PathBuf {
    PathBuf::from(".studykit")
}

impl Default for StudykitConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            min_flashcards: default_min_flashcards(),
            state_dir: default_state_dir(),
            providers: HashMap::new(),
        }
    }
}

impl StudykitConfig {
    /// Generation settings for `model`, or the configured default model.
    pub fn generation(&self, model: Option<&str>) -> GenerationConfig {
        GenerationConfig {
            model: model.unwrap_or(&self.default_model).to_string(),
            max_tokens: self.max_tokens,
            temperature: self.default_temperature,
        }
    }

    pub fn validator(&self) -> ValidatorConfig {
        ValidatorConfig {
            min_flashcards: self.min_flashcards,
            ..ValidatorConfig::default()
        }
    }

    /// Look up a provider by name and build it.
    ///
    /// `mock` is always available, configured or not.
    pub fn provider(&self, name: &str) -> Result<Arc<dyn LlmProvider>> {
        match self.providers.get(name) {
            Some(config) => create_provider(name, config),
            None if name == "mock" => create_provider(name, &ProviderConfig::Mock),
            None => anyhow::bail!(
                "provider '{name}' is not configured; add [providers.{name}] to studykit.toml \
                 or set STUDYKIT_{}_KEY",
                name.to_uppercase()
            ),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve_opt = |v: &Option<String>| v.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            org_id: resolve_opt(org_id),
        },
        ProviderConfig::Mock => ProviderConfig::Mock,
    }
}

/// Set the API key of provider `name`, inserting a fresh entry if needed.
fn override_key(config: &mut StudykitConfig, name: &str, key: String) {
    let entry = config
        .providers
        .entry(name.to_string())
        .or_insert_with(|| match name {
            "anthropic" => ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            },
            "openai" => ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            },
            _ => ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            },
        });
    match entry {
        ProviderConfig::Gemini { api_key, .. }
        | ProviderConfig::Anthropic { api_key, .. }
        | ProviderConfig::OpenAI { api_key, .. } => *api_key = key,
        ProviderConfig::Mock => {}
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studykit.toml` in the current directory
/// 2. `~/.config/studykit/config.toml`
///
/// Environment variable overrides: `STUDYKIT_GEMINI_KEY`,
/// `STUDYKIT_ANTHROPIC_KEY`, `STUDYKIT_OPENAI_KEY`.
pub fn load_config() -> Result<StudykitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudykitConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("studykit.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<StudykitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => StudykitConfig::default(),
    };

    for name in ["gemini", "anthropic", "openai"] {
        let var = format!("STUDYKIT_{}_KEY", name.to_uppercase());
        if let Ok(key) = std::env::var(&var) {
            override_key(&mut config, name, key);
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studykit"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    let key_required = |api_key: &str| -> Result<()> {
        if api_key.is_empty() {
            anyhow::bail!("provider '{name}' has an empty api_key");
        }
        Ok(())
    };
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            key_required(api_key)?;
            Ok(Arc::new(GeminiProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            key_required(api_key)?;
            Ok(Arc::new(AnthropicProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            key_required(api_key)?;
            Ok(Arc::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )))
        }
        ProviderConfig::Mock => Ok(Arc::new(MockProvider::with_sample_content())),
    }
}
