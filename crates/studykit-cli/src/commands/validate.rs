//! The `studykit validate` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use studykit_core::model::{ContentKind, LearningMode, NormalizedContent, TestSubtype};
use studykit_core::validator::ContentValidator;

use super::Context;

pub fn execute(
    ctx: &Context,
    mode: LearningMode,
    test_type: Option<TestSubtype>,
    content_path: PathBuf,
) -> Result<()> {
    let config = ctx.config()?;
    let text = std::fs::read_to_string(&content_path)
        .with_context(|| format!("failed to read content: {}", content_path.display()))?;
    let kind = ContentKind::for_mode(mode, test_type);

    let content = ContentValidator::new(config.validator()).validate_text(kind, &text)?;
    println!("Valid {kind} content: {}", describe(&content));
    Ok(())
}

/// A short count of what the content holds.
pub fn describe(content: &NormalizedContent) -> String {
    match content {
        NormalizedContent::Quiz(questions) => format!("{} questions", questions.len()),
        NormalizedContent::Flashcards(cards) => format!("{} cards", cards.len()),
        NormalizedContent::Matching(set) => format!("{} pairs", set.len()),
        NormalizedContent::Test(items) => format!("{} items", items.len()),
    }
}
