//! Error types for html2zpl library.

use std::io;
use thiserror::Error;

/// Result type alias for html2zpl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
///
/// Malformed HTML is never an error: the parser recovers from unclosed tags
/// and missing structure, and unknown CSS is dropped. Errors are reserved for
/// the I/O boundary and for configurations that cannot describe a label.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input bytes are not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The label configuration violates a canvas invariant.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    Config(String),

    /// Error during rendering (report serialization).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
