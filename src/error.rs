use thiserror::Error;

/// Result type for arclower operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the lowering pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Semantic error: {message}")]
    Semantic { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal pipeline error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a semantic error
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic { message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error. These indicate a broken pipeline-ordering or
    /// front-end contract and abort the current unit's lowering.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
