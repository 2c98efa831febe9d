//! Error types for the VTF texture library

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for VTF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for VTF texture operations
#[derive(Error, Debug)]
pub enum Error {
    /// Texture file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error occurred while reading the texture file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Magic value does not match the VTF signature
    #[error("Invalid VTF magic: {0:#010x}")]
    BadMagic(u32),

    /// Major revision other than 7, or a minor revision with an
    /// unknown header layout
    #[error("Unsupported VTF version: {major}.{minor}")]
    UnsupportedVersion {
        /// Major version from the header
        major: u32,
        /// Minor version from the header
        minor: u32,
    },

    /// Pixel format tag outside the known enumeration
    #[error("Unknown pixel format tag: {0}")]
    UnknownFormat(u32),

    /// Allocation failure while building the image tree
    #[error("Out of memory while reading texture data")]
    OutOfMemory,

    /// Structurally invalid file: truncated data, arithmetic overflow
    /// in a payload size, or inconsistent header fields
    #[error("Invalid VTF file: {0}")]
    InvalidFile(String),
}

impl Error {
    /// Create a new InvalidFile error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFile(msg.into())
    }

    /// Check if this error indicates a malformed texture file
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::BadMagic(_) | Error::UnknownFormat(_) | Error::InvalidFile(_)
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
        let err = Error::invalid("mip payload exceeds file length");
        assert_eq!(
            err.to_string(),
            "Invalid VTF file: mip payload exceeds file length"
        );

        let err = Error::UnsupportedVersion { major: 8, minor: 0 };
        assert_eq!(err.to_string(), "Unsupported VTF version: 8.0");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::BadMagic(0).is_corruption());
        assert!(Error::UnknownFormat(99).is_corruption());
        assert!(!Error::OutOfMemory.is_corruption());
    }
}
