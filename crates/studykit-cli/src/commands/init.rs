//! The `studykit init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = Path::new("studykit.toml");
    if path.exists() {
        println!("studykit.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG).context("failed to write studykit.toml")?;
        println!("Created studykit.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY (or edit studykit.toml for another provider)");
    println!("  2. Run: studykit upload notes.pdf");
    println!("  3. Run: studykit study --mode quiz");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studykit configuration

default_provider = "gemini"
default_model = "gemini-1.5-pro-latest"
default_temperature = 0.2
max_tokens = 8192
min_flashcards = 10
state_dir = ".studykit"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.mock]
type = "mock"
"#;
