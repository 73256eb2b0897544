use anyhow::{bail, Result};
use std::path::Path;

use super::database_path;
use crate::args::OutputFormat;
use crate::config::AppConfig;
use crate::prediction::DatabaseStats;
use crate::suggestion::SuggestionEngine;

pub fn handle_stats(config: &AppConfig, database: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = database_path(config, database);
    let mut engine = SuggestionEngine::new(config.suggestion.flags());
    if !engine.load_database(&path) {
        bail!("no readable prediction database at {}", path.display());
    }
    println!("{}", render_stats(&engine.stats(), format)?);
    Ok(())
}

pub fn render_stats(stats: &DatabaseStats, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(stats)?,
        OutputFormat::Text => format!(
            "forward:  {} anchors, {} records\nbackward: {} anchors, {} records\ntotal uses: {}",
            stats.forward_anchors,
            stats.forward_records,
            stats.backward_anchors,
            stats.backward_records,
            stats.total_uses
        ),
    })
}
