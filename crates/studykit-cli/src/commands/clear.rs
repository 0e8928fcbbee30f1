//! The `studykit clear` command.

use anyhow::Result;

use studykit_core::model::LearningMode;

use super::Context;

pub fn execute(ctx: &Context, progress: bool, mode: Option<LearningMode>) -> Result<()> {
    let config = ctx.config()?;
    let mut store = ctx.store(&config)?;

    match (progress, mode) {
        (_, Some(mode)) => {
            if store.clear_mode(mode.as_str())? {
                println!("Cleared {mode} progress.");
            } else {
                println!("No {mode} progress to clear.");
            }
        }
        (true, None) => {
            store.clear_progress()?;
            println!("Cleared all progress.");
        }
        (false, None) => match store.state().file_name.clone() {
            Some(name) => {
                store.clear_document()?;
                println!("Removed {name}.");
            }
            None => println!("No document uploaded."),
        },
    }
    Ok(())
}
