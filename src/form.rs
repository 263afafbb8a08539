//! QR form controller
//!
//! Holds the form fields, refuses to generate for text that is not shaped
//! like a URL, drives the [`Encoder`] and hands the stored image to an
//! [`Exporter`] on download.
//!
//! Every generation request carries a sequence number. A completion only
//! replaces the stored image when it is newer than the request that produced
//! the current one, so overlapping requests settle on the latest-issued
//! success regardless of the order they finish in.

use crate::error::{Error, Result};
use crate::export::{Exporter, OutputFormat, SavedFile};
use crate::payload::ImagePayload;
use crate::qr::{EncodeOptions, Encoder};
use crate::validate::is_valid_url;
use serde::Serialize;
use std::sync::Arc;

/// Smallest pixel size the form advertises
pub const PIXEL_SIZE_MIN: u32 = 100;
/// Largest pixel size the form advertises
pub const PIXEL_SIZE_MAX: u32 = 500;
/// Pixel size a fresh form starts with
pub const DEFAULT_PIXEL_SIZE: u32 = 200;

/// Inline message shown next to an invalid URL field
pub const INVALID_URL_MESSAGE: &str = "Invalid URL";

/// Editable form fields plus the last generated image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    url_text: String,
    output_format: OutputFormat,
    pixel_size: u32,
    generated_image: Option<ImagePayload>,
    touched: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            url_text: String::new(),
            output_format: OutputFormat::default(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            generated_image: None,
            touched: false,
        }
    }
}

impl FormState {
    /// Current URL text
    pub fn url_text(&self) -> &str {
        &self.url_text
    }

    /// Whether the current text has the shape of a URL
    pub fn is_valid(&self) -> bool {
        is_valid_url(&self.url_text)
    }

    /// Inline validation message, shown once the URL field has been edited
    pub fn validation_message(&self) -> Option<&'static str> {
        (self.touched && !self.is_valid()).then_some(INVALID_URL_MESSAGE)
    }

    /// Selected output format
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Selected pixel size
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Whether the pixel size lies within the advertised bounds.
    ///
    /// Purely informational; out-of-range sizes are still used as-is.
    pub fn pixel_size_in_advertised_range(&self) -> bool {
        (PIXEL_SIZE_MIN..=PIXEL_SIZE_MAX).contains(&self.pixel_size)
    }

    /// Last successfully generated image
    pub fn generated_image(&self) -> Option<&ImagePayload> {
        self.generated_image.as_ref()
    }

    /// Label of the download action, once there is something to download
    pub fn download_label(&self) -> Option<String> {
        self.generated_image
            .as_ref()
            .map(|_| format!("Download {}", self.output_format.label()))
    }
}

/// What a generation attempt did to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateOutcome {
    /// A new image was stored
    Generated,
    /// The URL text was invalid; nothing was encoded
    Rejected,
    /// The encoder finished after a newer request had already stored its image
    Stale,
}

/// A generation request detached from the form so several can be in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    seq: u64,
    text: String,
    options: EncodeOptions,
}

impl GenerationRequest {
    /// Sequence number assigned when the request was issued
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Text to be encoded
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Options passed to the encoder
    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Invoke `encoder` for this request
    pub async fn run(&self, encoder: &dyn Encoder) -> Result<ImagePayload> {
        encoder.encode(&self.text, self.options).await
    }
}

/// The QR form: state, encoder, and request bookkeeping
pub struct QrForm {
    state: FormState,
    encoder: Arc<dyn Encoder>,
    next_seq: u64,
    stored_seq: u64,
}

impl QrForm {
    /// Create an empty form backed by `encoder`
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            state: FormState::default(),
            encoder,
            next_seq: 1,
            stored_seq: 0,
        }
    }

    /// Read-only view of the form fields
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Shared handle to the encoder, for running detached requests
    pub fn encoder(&self) -> Arc<dyn Encoder> {
        Arc::clone(&self.encoder)
    }

    /// Replace the URL text
    pub fn set_url(&mut self, text: impl Into<String>) {
        self.state.url_text = text.into();
        self.state.touched = true;
        tracing::trace!(valid = self.state.is_valid(), "URL edited");
    }

    /// Select the output format
    pub fn set_format(&mut self, format: OutputFormat) {
        self.state.output_format = format;
    }

    /// Set the pixel size. Values outside the advertised range are kept.
    pub fn set_pixel_size(&mut self, size: u32) {
        if !(PIXEL_SIZE_MIN..=PIXEL_SIZE_MAX).contains(&size) {
            tracing::debug!(
                size,
                min = PIXEL_SIZE_MIN,
                max = PIXEL_SIZE_MAX,
                "Pixel size outside advertised range"
            );
        }
        self.state.pixel_size = size;
    }

    /// Issue a request for the current fields, or `None` when the URL is invalid.
    pub fn begin_generate(&mut self) -> Option<GenerationRequest> {
        if !self.state.is_valid() {
            tracing::error!(url = %self.state.url_text, "{INVALID_URL_MESSAGE}");
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        Some(GenerationRequest {
            seq,
            text: self.state.url_text.clone(),
            options: EncodeOptions {
                width: self.state.pixel_size,
            },
        })
    }

    /// Apply the result of request `seq`.
    ///
    /// Failures leave any previously stored image in place and are returned
    /// to the caller.
    pub fn complete(&mut self, seq: u64, result: Result<ImagePayload>) -> Result<GenerateOutcome> {
        match result {
            Ok(image) if seq > self.stored_seq => {
                self.stored_seq = seq;
                self.state.generated_image = Some(image);
                tracing::debug!(seq, "Stored generated QR code");
                Ok(GenerateOutcome::Generated)
            }
            Ok(_) => {
                tracing::debug!(
                    seq,
                    stored = self.stored_seq,
                    "Discarding stale QR code"
                );
                Ok(GenerateOutcome::Stale)
            }
            Err(err) => {
                tracing::error!(seq, "Error generating QR code: {err}");
                Err(match err {
                    Error::QrEncode(_) => err,
                    other => Error::QrEncode(other.to_string()),
                })
            }
        }
    }

    /// Validate, encode and store the current URL
    pub async fn generate(&mut self) -> Result<GenerateOutcome> {
        let Some(request) = self.begin_generate() else {
            return Ok(GenerateOutcome::Rejected);
        };

        let encoder = self.encoder();
        let result = request.run(encoder.as_ref()).await;
        self.complete(request.seq(), result)
    }

    /// Save the stored image in the selected format.
    ///
    /// Returns `Ok(None)` without saving anything when no image exists yet.
    pub fn download(&self, exporter: &Exporter) -> Result<Option<SavedFile>> {
        let Some(image) = self.state.generated_image.as_ref() else {
            tracing::debug!("Nothing to download yet");
            return Ok(None);
        };

        exporter.export(image, self.state.output_format).map(Some)
    }
}
