pub mod args;
pub mod capability;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod logging;
pub mod path;
pub mod prediction;
pub mod suggestion;
pub mod validation;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use corpus::{Corpus, MemoryCorpus};
pub use errors::AppError;
pub use identity::NodeIdentity;
pub use path::AdjacencyPath;
pub use prediction::{Direction, PredictionDatabase, PredictionRecord};
pub use suggestion::{SuggestionContext, SuggestionEngine, SuggestionFlags, SuggestionResult};
