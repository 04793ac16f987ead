//! Error types for the dose_core library.
//!
//! Only ambient operations (file I/O, config, catalog loading, CLI input
//! parsing) produce an [`Error`]. Domain outcomes such as an unparsable
//! formulation or a dose that cannot be computed are not errors; they are
//! ordinary values (`Option` / [`crate::calculator::NoDose`]).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dose_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation or lookup error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Unrecognized dose unit in user input
    #[error("Unrecognized unit: {0}")]
    Unit(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
