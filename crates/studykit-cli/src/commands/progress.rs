//! The `studykit progress` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use studykit_core::matching::format_elapsed;
use studykit_core::model::LearningMode;
use studykit_core::store::ScoreStore;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.store(&config)?;

    match &store.state().file_name {
        Some(name) => println!("Document: {name}"),
        None => println!("Document: none (run `studykit upload <pdf>`)"),
    }
    println!("{}", progress_table(&store));
    Ok(())
}

fn progress_table(store: &ScoreStore) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Mode", "Progress", "Last score"]);

    for mode in LearningMode::ALL {
        let record = store.get_progress(mode.as_str());
        let progress = record
            .as_ref()
            .and_then(|r| r.progress)
            .map(|p| format!("{p:.0}%"))
            .unwrap_or_else(|| "-".to_string());
        let score = record
            .as_ref()
            .and_then(|r| r.last_score)
            .map(|s| format_score(mode, s))
            .unwrap_or_else(|| "not attempted".to_string());
        table.add_row(vec![Cell::new(mode), Cell::new(progress), Cell::new(score)]);
    }
    table
}

/// Matching scores are elapsed seconds, everything else a percentage.
fn format_score(mode: LearningMode, score: f64) -> String {
    if mode.scores_time() {
        format_elapsed(score.max(0.0).round() as u64)
    } else {
        format!("{score:.0}%")
    }
}
