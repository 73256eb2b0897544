use anyhow::{bail, Result};
use std::path::Path;

use super::{database_path, load_corpus};
use crate::config::AppConfig;
use crate::suggestion::SuggestionEngine;

/// Mine `corpus_dir` from scratch and save the database.
pub fn handle_rebuild(config: &AppConfig, corpus_dir: &Path, database: Option<&Path>) -> Result<()> {
    let corpus = load_corpus(corpus_dir)?;
    let mut engine = SuggestionEngine::new(config.suggestion.flags());
    let summary = engine.fill_database(&corpus);

    let path = database_path(config, database);
    if !engine.save_database(&path) {
        bail!("could not save prediction database to {}", path.display());
    }

    let stats = engine.stats();
    println!(
        "Mined {} graphs ({} nodes): {} forward and {} backward records, saved to {}",
        summary.graphs,
        summary.nodes,
        stats.forward_records,
        stats.backward_records,
        path.display()
    );
    Ok(())
}
