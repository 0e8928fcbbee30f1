//! The `studykit upload` command.

use std::path::PathBuf;

use anyhow::Result;

use studykit_core::document::PdfDocument;

use super::Context;

pub fn execute(ctx: &Context, pdf: PathBuf) -> Result<()> {
    let config = ctx.config()?;
    let document = PdfDocument::from_path(&pdf)?;
    let mut store = ctx.store(&config)?;

    if let Some(previous) = &store.state().file_name {
        if previous != &document.file_name {
            println!("Replacing {previous}");
        }
    }
    store.set_document(&document)?;
    println!("Uploaded {}", document.file_name);
    Ok(())
}
