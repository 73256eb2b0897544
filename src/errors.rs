use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Prediction database error: {0}")]
    Persist(#[from] PersistError),
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("I/O error while {0}: {1}")]
    IO(String, #[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Configuration field '{field}' is invalid: {reason}")]
    FieldInvalid { field: String, reason: String },
}

/// Failures reading or writing the binary prediction database layout.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O failure on database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database format version {found} does not match expected version {expected}")]
    VersionMismatch { found: i32, expected: i32 },
    #[error("Database file ended unexpectedly")]
    Truncated,
    #[error("Stored signature is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Stored direction value {0} is not a known direction")]
    InvalidDirection(i32),
    #[error("Stored length {0} is negative")]
    NegativeLength(i32),
    #[error("Stored context path of length {0} exceeds the maximum")]
    ContextTooLong(usize),
    #[error("Stored use count {0} is not positive")]
    InvalidUseCount(i32),
    #[error("Value {0} does not fit the 32-bit on-disk layout")]
    Overflow(usize),
    #[error("Record stored in the {map} map under '{key}' carries {direction} direction and anchor '{anchor}'")]
    InconsistentRecord {
        map: String,
        key: String,
        direction: String,
        anchor: String,
    },
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus root '{0}' does not exist")]
    RootMissing(String),
    #[error("Failed to read corpus file '{0}': {1}")]
    Read(String, #[source] std::io::Error),
    #[error("Failed to parse corpus file '{0}': {1}")]
    Parse(String, #[source] serde_json::Error),
    #[error("Graph '{graph}' has no node '{node}'")]
    UnknownNode { graph: String, node: String },
    #[error("Node '{node}' has no connector '{connector}'")]
    UnknownConnector { node: String, connector: String },
    #[error("Invalid link in graph '{graph}': {reason}")]
    InvalidLink { graph: String, reason: String },
    #[error("Graph '{graph}' declares node '{node}' more than once")]
    DuplicateNode { graph: String, node: String },
    #[error("Graph '{0}' not found in corpus")]
    UnknownGraph(String),
}

pub fn config_error(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::FieldInvalid {
        field: field.into(),
        reason: reason.into(),
    }
}
