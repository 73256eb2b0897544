use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nodesuggest - learn node adjacency from graph corpora and suggest the next node
#[derive(Parser, Debug)]
#[command(name = "nodesuggest", version)]
#[command(about = "Mine node graphs and rank the nodes most likely to be wired next")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default ~/.config/nodesuggest/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mine a corpus directory and save the prediction database
    Rebuild {
        /// Directory of JSON asset documents
        #[arg(long)]
        corpus: PathBuf,
        /// Database file (overrides config)
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Rank suggestions for one connector of one node
    Suggest {
        #[arg(long)]
        corpus: PathBuf,
        /// Graph name, or asset/graph
        #[arg(long)]
        graph: String,
        /// Node id within the graph
        #[arg(long)]
        node: String,
        /// Connector name on the node
        #[arg(long)]
        connector: String,
        /// Number of suggestions (overrides config)
        #[arg(long)]
        count: Option<usize>,
        /// Flip a ranking flag by name; repeatable
        #[arg(long = "toggle", value_name = "FLAG")]
        toggles: Vec<String>,
        #[arg(long)]
        database: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Learn from one newly created link and save the database
    Link {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        graph: String,
        /// Node id on the output side
        #[arg(long)]
        from: String,
        /// Node id on the input side
        #[arg(long)]
        to: String,
        /// Create the link from this output connector first
        #[arg(long, requires = "to_connector")]
        from_connector: Option<String>,
        /// Create the link into this input connector first
        #[arg(long, requires = "from_connector")]
        to_connector: Option<String>,
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Measure suggestion precision with k-fold cross validation
    Kfold {
        #[arg(long)]
        corpus: PathBuf,
        /// Number of folds (at least 2)
        #[arg(long)]
        folds: Option<usize>,
        /// Suggestions requested per held-out connector
        #[arg(long)]
        suggestions: Option<usize>,
        /// Shuffle seed
        #[arg(long, conflicts_with = "sequential")]
        seed: Option<u64>,
        /// Deal nodes into folds in corpus order
        #[arg(long)]
        sequential: bool,
        /// Also write the report as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print prediction database statistics
    Stats {
        #[arg(long)]
        database: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggest_with_toggles() {
        let args = Args::try_parse_from([
            "nodesuggest",
            "-vv",
            "suggest",
            "--corpus",
            "graphs",
            "--graph",
            "Main",
            "--node",
            "b",
            "--connector",
            "in",
            "--toggle",
            "rank-by-uses-first",
            "--toggle",
            "CalculateContext",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Suggest {
                toggles, format, count, ..
            } => {
                assert_eq!(toggles, ["rank-by-uses-first", "CalculateContext"]);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(count, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_kfold_seed_conflicts_with_sequential() {
        let result = Args::try_parse_from([
            "nodesuggest",
            "kfold",
            "--corpus",
            "graphs",
            "--seed",
            "3",
            "--sequential",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_link_connectors_come_in_pairs() {
        let result = Args::try_parse_from([
            "nodesuggest",
            "link",
            "--corpus",
            "graphs",
            "--graph",
            "Main",
            "--from",
            "a",
            "--to",
            "b",
            "--from-connector",
            "out",
        ]);
        assert!(result.is_err());
    }
}
