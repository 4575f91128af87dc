//! Error types for msgstore_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using msgstore_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store and message operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Bytes are not a valid encoding of the requested record type.
    #[error("Cannot decode record: {reason}")]
    Decode { reason: String },

    /// Record file exists but its content does not decode.
    #[error("Corrupted record at {path}: {reason}")]
    CorruptedRecord { path: PathBuf, reason: String },

    /// Record could not be serialized.
    #[error("Cannot encode record: {reason}")]
    Encode { reason: String },

    /// Identifier or file name suffix is not a valid escape sequence.
    #[error("Invalid escape in {input:?}: {reason}")]
    InvalidEscape { input: String, reason: String },
}

impl Error {
    /// Create a Decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Error::Decode {
            reason: reason.into(),
        }
    }

    /// Create a CorruptedRecord error.
    pub fn corrupted_record(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptedRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Error::Encode {
            reason: reason.into(),
        }
    }

    /// Create an InvalidEscape error.
    pub fn invalid_escape(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidEscape {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Attach the file a Decode error came from. Other errors pass through.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Decode { reason } => Error::corrupted_record(path, reason),
            other => other,
        }
    }

    /// Whether this error wraps an I/O "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
