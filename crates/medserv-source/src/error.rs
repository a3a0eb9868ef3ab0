//! Error types for medserv-source

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid format in {location}: {message}")]
    InvalidFormat {
        location: String,
        message: String,
    },

    #[error("Failed to decode {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl SourceError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        SourceError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type with SourceError
pub type SourceResult<T> = Result<T, SourceError>;
