use anyhow::{bail, Result};
use std::path::PathBuf;

use super::{database_path, load_corpus, locate_graph, locate_node};
use crate::config::AppConfig;
use crate::suggestion::SuggestionEngine;

#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub corpus: PathBuf,
    pub graph: String,
    pub from: String,
    pub to: String,
    /// When both are set the link is created before learning from it.
    pub connectors: Option<(String, String)>,
    pub database: Option<PathBuf>,
}

pub fn handle_link(config: &AppConfig, request: LinkRequest) -> Result<()> {
    let mut corpus = load_corpus(&request.corpus)?;
    let graph = locate_graph(&corpus, &request.graph)?;
    let from = locate_node(&corpus, graph, &request.from)?;
    let to = locate_node(&corpus, graph, &request.to)?;
    if let Some((from_connector, to_connector)) = &request.connectors {
        corpus.connect(from, from_connector, to, to_connector)?;
    }

    let mut engine = SuggestionEngine::new(config.suggestion.flags());
    let path = database_path(config, request.database.as_deref());
    if !engine.load_database(&path) {
        tracing::warn!(path = %path.display(), "Starting from an empty prediction database");
    }

    let learned = engine.generate_for_created_link(&corpus, from, to);
    if !engine.save_database(&path) {
        bail!("could not save prediction database to {}", path.display());
    }
    println!(
        "Learned {} records from {} -> {}",
        learned, request.from, request.to
    );
    Ok(())
}
