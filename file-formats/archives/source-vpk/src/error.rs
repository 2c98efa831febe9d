//! Error types for the VPK directory library

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for VPK operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for VPK directory operations
#[derive(Error, Debug)]
pub enum Error {
    /// Directory file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error occurred while reading the directory file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input is shorter than the minimal VPK header
    #[error("File too small to be a VPK directory: {size} bytes")]
    TooSmall {
        /// Actual input length in bytes
        size: usize,
    },

    /// Magic value does not match the VPK signature
    #[error("Invalid VPK signature: {0:#010x}")]
    BadSignature(u32),

    /// Directory version other than 1 or 2
    #[error("Unsupported VPK version: {0}")]
    UnsupportedVersion(u32),

    /// Allocation failure while building the directory tree
    #[error("Out of memory while reading directory tree")]
    OutOfMemory,

    /// Input ended in the middle of a record
    #[error("Unexpected end of directory tree")]
    UnexpectedEof,

    /// Structural corruption outside the named categories
    #[error("Corrupted VPK directory: {0}")]
    Corrupted(String),
}

impl Error {
    /// Create a new Corrupted error
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        Error::Corrupted(msg.into())
    }

    /// Check if this error indicates a malformed directory file
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::TooSmall { .. }
                | Error::BadSignature(_)
                | Error::UnexpectedEof
                | Error::Corrupted(_)
        )
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::corrupted("missing entry terminator");
        assert_eq!(
            err.to_string(),
            "Corrupted VPK directory: missing entry terminator"
        );

        let err = Error::BadSignature(0xdeadbeef);
        assert_eq!(err.to_string(), "Invalid VPK signature: 0xdeadbeef");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::UnexpectedEof.is_corruption());
        assert!(Error::TooSmall { size: 4 }.is_corruption());
        assert!(!Error::UnsupportedVersion(3).is_corruption());
        assert!(!Error::OutOfMemory.is_corruption());
    }
}
