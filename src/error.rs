//! Crate-wide error type.
//!
//! Parameter problems are always reported before any output is produced.
//! Storage problems come from the edit history and leave the in-memory
//! state valid for the rest of the session.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied numeric parameter violates its precondition.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Raw sample data does not match the declared dimensions.
    #[error("buffer of {actual} bytes does not fit {width}x{height} with {channels} channels")]
    Shape {
        width: usize,
        height: usize,
        channels: usize,
        actual: usize,
    },

    /// Reading or writing the history store failed.
    #[error("history storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot image could not be encoded or decoded.
    #[error("history image error at {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The history index could not be serialized or parsed.
    #[error("history index error: {0}")]
    Index(#[from] serde_json::Error),

    /// An engine configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }

    /// True for persistence failures that the caller may treat as warnings.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Storage { .. } | Error::Encode { .. } | Error::Index(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = Error::invalid("kernel size must be odd, got 4");
        assert_eq!(err.to_string(), "invalid parameter: kernel size must be odd, got 4");
        assert!(!err.is_storage());
    }

    #[test]
    fn test_storage_is_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::storage("/tmp/history.json", io);
        assert!(err.is_storage());
        assert!(err.to_string().contains("history.json"));
    }
}
