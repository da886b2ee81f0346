//! Error types for the analyzer

use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, analyzing, or persisting a document
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load a document (file read or HTTP fetch)
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// The document could not be analyzed
    #[error("Analysis failed: {0}")]
    AnalysisError(String),

    /// Failed to write an annotated document
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to read or write the run history store
    #[error("History storage failed: {0}")]
    StorageError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
