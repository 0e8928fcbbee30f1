//! The `studykit generate` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use studykit_core::model::{ContentKind, LearningMode, TestSubtype};

use super::{build_generator, resolve_document, Context};

pub async fn execute(
    ctx: &Context,
    mode: LearningMode,
    test_type: Option<TestSubtype>,
    pdf: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        test_type.is_none() || mode == LearningMode::Test,
        "--test-type only applies to --mode test"
    );

    let config = ctx.config()?;
    let store = ctx.store(&config)?;
    let document = resolve_document(&store, pdf.as_deref())?;
    let generator = build_generator(&config, provider.as_deref(), model.as_deref())?;
    let kind = ContentKind::for_mode(mode, test_type);

    eprintln!("Generating {kind} from {}...", document.file_name);
    let content = match generator.generate(&document, kind).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("{e:#}");
            anyhow::bail!(e.user_message());
        }
    };

    let path = match output {
        Some(path) => path,
        None => {
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
            ctx.state_dir(&config)
                .join("content")
                .join(format!("{mode}-{timestamp}.json"))
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&content.to_json())?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write content: {}", path.display()))?;

    println!("{}", path.display());
    Ok(())
}
