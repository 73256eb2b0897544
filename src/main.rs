use anyhow::{Context, Result};
use clap::Parser;

use nodesuggest::args::{Args, Command};
use nodesuggest::config::AppConfig;
use nodesuggest::handlers::{
    kfold::{handle_kfold, KFoldRequest},
    link::{handle_link, LinkRequest},
    rebuild::handle_rebuild,
    stats::handle_stats,
    suggest::{handle_suggest, SuggestRequest},
};
use nodesuggest::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging(LoggingConfig::from_verbosity(args.verbose, args.quiet)) {
        eprintln!("failed to initialize logging: {e}");
    }

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path.clone()),
        None => AppConfig::load(),
    }
    .context("loading configuration")?;

    match args.command {
        Command::Rebuild { corpus, database } => {
            handle_rebuild(&config, &corpus, database.as_deref())?;
        }
        Command::Suggest {
            corpus,
            graph,
            node,
            connector,
            count,
            toggles,
            database,
            format,
        } => {
            handle_suggest(
                &config,
                SuggestRequest {
                    corpus,
                    graph,
                    node,
                    connector,
                    count,
                    toggles,
                    database,
                    format,
                },
            )?;
        }
        Command::Link {
            corpus,
            graph,
            from,
            to,
            from_connector,
            to_connector,
            database,
        } => {
            handle_link(
                &config,
                LinkRequest {
                    corpus,
                    graph,
                    from,
                    to,
                    connectors: from_connector.zip(to_connector),
                    database,
                },
            )?;
        }
        Command::Kfold {
            corpus,
            folds,
            suggestions,
            seed,
            sequential,
            csv,
            format,
        } => {
            handle_kfold(
                &config,
                KFoldRequest {
                    corpus,
                    folds,
                    suggestions,
                    seed,
                    sequential,
                    csv,
                    format,
                },
            )?;
        }
        Command::Stats { database, format } => {
            handle_stats(&config, database.as_deref(), format)?;
        }
    }

    Ok(())
}
