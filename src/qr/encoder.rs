//! QR code encoder

use crate::error::{Error, Result};
use crate::payload::ImagePayload;
use crate::qr::{EncodeOptions, Encoder};
use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, imageops};
use qrcode::QrCode;
use std::io::Cursor;

/// Modules of white border on each side of the symbol
const QUIET_ZONE: u32 = 4;

/// Largest grayscale canvas rendered, in bytes (16384 x 16384)
const MAX_CANVAS_BYTES: u64 = 1 << 28;

/// QR code encoder producing square PNG data URIs
#[derive(Debug, Clone)]
pub struct QrEncoder {
    /// Error correction level
    ecc_level: qrcode::EcLevel,
}

impl QrEncoder {
    /// Create a new QR encoder with default settings (Medium ECC)
    pub fn new() -> Self {
        Self {
            ecc_level: qrcode::EcLevel::M,
        }
    }

    /// Render `text` into a `width` x `width` grayscale image.
    ///
    /// Modules are scaled by the largest whole factor that fits and the
    /// symbol is centered on white. When even one pixel per module does not
    /// fit, the image is returned at its minimal size instead.
    pub fn render(&self, text: &str, width: u32) -> Result<GrayImage> {
        let canvas_bytes = u64::from(width)
            .checked_mul(u64::from(width))
            .filter(|bytes| *bytes <= MAX_CANVAS_BYTES)
            .ok_or_else(|| {
                Error::QrEncode(format!(
                    "Requested width {width}px exceeds the {MAX_CANVAS_BYTES} byte canvas limit"
                ))
            })?;
        tracing::trace!(width, canvas_bytes, "Rendering QR canvas");

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let modules = code.width() as u32 + 2 * QUIET_ZONE;
        let scale = (width / modules).max(1);

        let symbol = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .module_dimensions(scale, scale)
            .build();

        if symbol.width() >= width {
            return Ok(symbol);
        }

        let mut canvas = GrayImage::from_pixel(width, width, Luma([255]));
        let offset = i64::from((width - symbol.width()) / 2);
        imageops::overlay(&mut canvas, &symbol, offset, offset);
        Ok(canvas)
    }

    /// Render `text` and wrap the PNG in a data URI
    pub fn encode_blocking(&self, text: &str, width: u32) -> Result<ImagePayload> {
        let image = self.render(text, width)?;

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        tracing::debug!(width, bytes = bytes.len(), "Rendered QR code");
        Ok(ImagePayload::from_png_bytes(&bytes))
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for QrEncoder {
    async fn encode(&self, text: &str, options: EncodeOptions) -> Result<ImagePayload> {
        let encoder = self.clone();
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || encoder.encode_blocking(&text, options.width))
            .await
            .map_err(|e| Error::QrEncode(format!("Encoder task failed: {e}")))?
    }
}
