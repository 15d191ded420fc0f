//! Error types for the guide design wrappers.
//!
//! The scanning and scoring core never fails on sequence content; these
//! variants cover the outer surfaces (input validation, configuration,
//! sequence loading and export).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Species '{species}' is not supported. Supported species: {supported}")]
    InvalidSpecies { species: String, supported: String },

    #[error("Invalid PAM pattern '{0}': expected exactly 3 IUPAC symbols")]
    InvalidPam(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty sequence: {0}")]
    EmptySequence(String),
}

pub type Result<T> = std::result::Result<T, DesignError>;
