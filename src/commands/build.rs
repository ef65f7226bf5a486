use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calfeed_core::feed::write_feed;
use calfeed_core::{GenerationPass, Settings};
use owo_colors::OwoColorize;

use crate::content;

/// File the template views are written to, under the output path.
const VIEWS_FILE: &str = "events.json";

pub fn run(config: &Path, content_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut settings = Settings::load(config)
        .with_context(|| format!("Failed to load configuration from {}", config.display()))?;
    if let Some(output) = output {
        settings.output_path = output;
    }
    let output_path = settings.output_path.clone();

    let mut pass = GenerationPass::new(settings)?;
    let now = pass.now();
    pass.begin(now).context("Failed to expand recurring events")?;

    let items = content::load_dir(content_dir)?;
    let mut failed = 0;
    for item in &items {
        if let Err(e) = pass.on_content(item) {
            tracing::error!(url = %item.url, "{}", e);
            failed += 1;
        }
    }

    let output = pass.finish(now)?;

    let views_path = output_path.join(VIEWS_FILE);
    let json = output.views.to_json()?;
    write_feed(&views_path, json.as_bytes())
        .with_context(|| format!("Failed to write {}", views_path.display()))?;

    println!(
        "{}",
        format!(
            "Processed {} items: {} events, {} upcoming",
            items.len(),
            output.views.all.len(),
            output.views.upcoming.len()
        )
        .green()
    );
    if let Some(path) = output.feed_path {
        println!("  Feed: {}", path.display());
    }
    println!("  Views: {}", views_path.display());
    if failed > 0 {
        println!("{}", format!("  Skipped {} items with errors", failed).yellow());
    }

    Ok(())
}
