//! Subcommand implementations and the plumbing they share.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use studykit_core::document::PdfDocument;
use studykit_core::generation::ContentGenerator;
use studykit_core::store::{JsonFileStorage, ScoreStore};
use studykit_core::validator::ContentValidator;
use studykit_providers::{load_config_from, StudykitConfig};

pub mod clear;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod progress;
pub mod study;
pub mod upload;
pub mod validate;

/// Global options every subcommand sees.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

impl Context {
    pub fn config(&self) -> Result<StudykitConfig> {
        load_config_from(self.config_path.as_deref())
    }

    pub fn store(&self, config: &StudykitConfig) -> Result<ScoreStore> {
        let dir = self.state_dir(config);
        ScoreStore::open(Box::new(JsonFileStorage::in_dir(dir)))
            .with_context(|| format!("failed to open study state in {}", dir.display()))
    }

    pub fn state_dir<'a>(&'a self, config: &'a StudykitConfig) -> &'a Path {
        self.state_dir.as_deref().unwrap_or(&config.state_dir)
    }
}

/// The PDF at `path`, or the uploaded document.
pub fn resolve_document(store: &ScoreStore, path: Option<&Path>) -> Result<PdfDocument> {
    if let Some(path) = path {
        return PdfDocument::from_path(path);
    }
    store.document()?.ok_or_else(|| {
        anyhow::anyhow!("no document uploaded; run `studykit upload <pdf>` or pass --pdf")
    })
}

/// Build a generator for the named (or default) provider and model.
pub fn build_generator(
    config: &StudykitConfig,
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<ContentGenerator> {
    let provider_name = provider.unwrap_or(&config.default_provider);
    let provider = config.provider(provider_name)?;
    let model = match model {
        Some(model) => model.to_string(),
        None if provider_name == config.default_provider => config.default_model.clone(),
        // The configured default model belongs to the default provider.
        None => provider
            .available_models()
            .first()
            .map(|m| m.id.clone())
            .unwrap_or_else(|| config.default_model.clone()),
    };
    Ok(ContentGenerator::new(
        provider,
        ContentValidator::new(config.validator()),
        config.generation(Some(&model)),
    ))
}
