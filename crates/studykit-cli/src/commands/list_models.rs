//! The `studykit list-models` command.

use anyhow::Result;

use studykit_providers::create_provider;

use super::Context;

pub fn execute(ctx: &Context, provider_filter: Option<String>) -> Result<()> {
    let config = ctx.config()?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;
    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let provider = match create_provider(name, &config.providers[name]) {
            Ok(provider) => provider,
            Err(e) => {
                eprintln!("Skipping {name}: {e:#}");
                continue;
            }
        };
        let models = provider.available_models();
        if models.is_empty() {
            continue;
        }

        found_any = true;
        let marker = if *name == config.default_provider { " (default)" } else { "" };
        println!("Provider: {name}{marker}");
        for model in &models {
            println!(
                "  {} - {} ({}K context{})",
                model.id,
                model.name,
                model.max_context / 1000,
                if model.accepts_pdf { ", PDF input" } else { "" },
            );
        }
        println!();
    }

    if !found_any {
        println!("No providers configured. Run `studykit init` to create a config file.");
    }

    Ok(())
}
