use anyhow::Result;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::{database_path, load_corpus, locate_connector, locate_graph, locate_node};
use crate::args::OutputFormat;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::suggestion::{SuggestionContext, SuggestionEngine, SuggestionResult};

#[derive(Debug, Clone)]
pub struct SuggestRequest {
    pub corpus: PathBuf,
    pub graph: String,
    pub node: String,
    pub connector: String,
    pub count: Option<usize>,
    pub toggles: Vec<String>,
    pub database: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn handle_suggest(config: &AppConfig, request: SuggestRequest) -> Result<()> {
    let results = suggest(config, &request)?;
    println!("{}", render_suggestions(&results, request.format)?);
    Ok(())
}

/// Load (or rebuild) the database and rank suggestions for one connector.
pub fn suggest(config: &AppConfig, request: &SuggestRequest) -> Result<Vec<SuggestionResult>, AppError> {
    let count = request.count.unwrap_or(config.suggestion.count);
    if count == 0 {
        return Err(AppError::Validation("--count must be at least 1".to_string()));
    }

    let corpus = load_corpus(&request.corpus)?;
    let graph = locate_graph(&corpus, &request.graph)?;
    let node = locate_node(&corpus, graph, &request.node)?;
    let connector = locate_connector(&corpus, node, &request.connector)?;

    let mut engine = SuggestionEngine::new(config.suggestion.flags());
    for toggle in &request.toggles {
        engine.toggle_flag(toggle);
    }

    let path = database_path(config, request.database.as_deref());
    if !engine.load_database(&path) {
        tracing::info!("No usable prediction database, rebuilding from corpus");
        engine.fill_database(&corpus);
    }

    Ok(engine.provide_suggestions(&corpus, &SuggestionContext::single(node, connector), count))
}

pub fn render_suggestions(results: &[SuggestionResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                return Ok("No suggestions".to_string());
            }
            let mut out = String::new();
            for (rank, result) in results.iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {}  (context {:.2}, uses {})",
                    rank + 1,
                    result.prediction,
                    result.context_score,
                    result.uses_score
                )?;
            }
            Ok(out.trim_end().to_string())
        }
    }
}
