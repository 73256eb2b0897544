use anyhow::{Context, Result};
use std::path::PathBuf;

use super::load_corpus;
use crate::args::OutputFormat;
use crate::config::{AppConfig, FoldOrderKind};
use crate::validation::{run_k_fold, KFoldReport};

#[derive(Debug, Clone, Default)]
pub struct KFoldRequest {
    pub corpus: PathBuf,
    pub folds: Option<usize>,
    pub suggestions: Option<usize>,
    pub seed: Option<u64>,
    pub sequential: bool,
    pub csv: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn handle_kfold(config: &AppConfig, request: KFoldRequest) -> Result<()> {
    let report = kfold(config, &request)?;

    if let Some(csv_path) = &request.csv {
        report
            .write_csv(csv_path)
            .with_context(|| format!("writing {}", csv_path.display()))?;
        tracing::info!(path = %csv_path.display(), "Wrote cross validation CSV");
    }

    match request.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

/// Apply command-line overrides to the configured validation settings and run.
pub fn kfold(config: &AppConfig, request: &KFoldRequest) -> Result<KFoldReport> {
    let mut validation = config.validation.clone();
    if let Some(folds) = request.folds {
        validation.folds = folds;
    }
    if let Some(suggestions) = request.suggestions {
        validation.suggestions_per_test = suggestions;
    }
    if let Some(seed) = request.seed {
        validation.seed = seed;
        validation.fold_order = FoldOrderKind::Shuffled;
    }
    if request.sequential {
        validation.fold_order = FoldOrderKind::Sequential;
    }
    validation.validate()?;

    let corpus = load_corpus(&request.corpus)?;
    Ok(run_k_fold(
        &corpus,
        &validation.kfold_config(config.suggestion.flags()),
    ))
}
