pub mod app_config;
pub mod loader;
pub mod suggestion_config;
pub mod validation_config;

pub use app_config::{AppConfig, StorageConfig, CONFIG_FILE_NAME, DEFAULT_DATABASE_PATH};
pub use loader::ConfigLoader;
pub use suggestion_config::SuggestionConfig;
pub use validation_config::{FoldOrderKind, ValidationConfig};
