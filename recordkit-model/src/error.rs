//! Error types for the record model.
//!
//! Record reads and writes never fail; these cover encoding, configuration
//! loading, and default-store setup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// An attribute map was built from a JSON value that is not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The process-wide default store was already initialized.
    #[error("default store already initialized")]
    DefaultStoreInitialized,

    /// A configured kind extends a kind that was not declared before it.
    #[error("kind `{kind}` extends unknown kind `{parent}`")]
    UnknownParent { kind: String, parent: String },

    /// Two kinds share a name.
    #[error("kind `{0}` is defined more than once")]
    DuplicateKind(String),

    /// Configuration file could not be parsed.
    #[error("invalid model config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
