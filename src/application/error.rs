//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DomainError, ParseError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// A domain error raised while handling one corpus file
    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ParseError> for ApplicationError {
    fn from(e: ParseError) -> Self {
        Self::Domain(DomainError::Parse(e))
    }
}

impl ApplicationError {
    /// Attach the corpus file a domain error came from.
    pub fn in_file(path: impl Into<PathBuf>, source: DomainError) -> Self {
        Self::InFile {
            path: path.into(),
            source,
        }
    }

    /// The underlying domain error, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::InFile { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
