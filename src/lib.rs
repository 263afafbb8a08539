//! QRFORM - turn a URL into a downloadable QR code
//!
//! This library provides the controller behind a small "link to QR code"
//! form: validate what the user typed, render it as a PNG data URI, and
//! save it either as the raw image or wrapped in a single-page PDF.
//!
//! # Features
//!
//! - **Validation**: URL shape check recomputed on every read
//! - **QR Rendering**: Exact-width PNG output via the `qrcode` crate
//! - **Export**: Raw PNG or one-page A4 PDF via `lopdf`
//! - **Pluggable**: Encoder, document packager and save target are traits
//!
//! # Example
//!
//! ```no_run
//! use qrform::{DirectorySink, Exporter, OutputFormat, PdfPackager, QrEncoder, QrForm};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> qrform::Result<()> {
//!     let mut form = QrForm::new(Arc::new(QrEncoder::new()));
//!     form.set_url("https://example.com");
//!     form.set_format(OutputFormat::Document);
//!     form.generate().await?;
//!
//!     let exporter = Exporter::new(Box::new(PdfPackager::new()), Box::new(DirectorySink::new(".")));
//!     form.download(&exporter)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod payload;
pub mod qr;
pub mod validate;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{FormOptions, LogRotation, LoggingOptions, QrformConfig};
pub use export::{
    DirectorySink, DocumentPackager, Exporter, OutputFormat, PageGeometry, PdfPackager, Placement,
    SaveTarget, SavedFile,
};
pub use form::{FormState, GenerateOutcome, GenerationRequest, QrForm};
pub use payload::ImagePayload;
pub use qr::{EncodeOptions, Encoder, QrEncoder};
pub use validate::is_valid_url;
