//! Error types for qrform operations

use thiserror::Error;

/// Result type alias using qrform's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrform operations
#[derive(Error, Debug)]
pub enum Error {
    /// Text does not have the shape of a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// Image payload is not a well-formed base64 data URI
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Document construction or serialization failed
    #[error("Document packaging error: {0}")]
    Document(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::InvalidPayload(format!("base64 decode error: {}", e))
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Document(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
