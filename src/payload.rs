//! Image payloads carried as base64 data URIs

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

const PNG_MIME: &str = "image/png";

/// An image encoded inline as `data:<mime>;base64,<data>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImagePayload {
    uri: String,
    data_offset: usize,
}

impl ImagePayload {
    /// Wrap PNG bytes into a data URI
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        let prefix = format!("data:{PNG_MIME};base64,");
        let data_offset = prefix.len();
        Self {
            uri: prefix + &STANDARD.encode(bytes),
            data_offset,
        }
    }

    /// Parse and validate a data URI
    pub fn parse(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidPayload("missing 'data:' scheme".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidPayload("missing ',' separator".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(Error::InvalidPayload(
                "only base64 data URIs are supported".to_string(),
            ));
        }
        STANDARD.decode(data)?;

        let data_offset = uri.len() - data.len();
        Ok(Self { uri, data_offset })
    }

    /// The full data URI, usable directly as an image source
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Media type declared by the URI (e.g. `image/png`)
    pub fn mime_type(&self) -> &str {
        let header = &self.uri["data:".len()..self.data_offset - 1];
        header
            .strip_suffix(";base64")
            .unwrap_or(header)
            .split(';')
            .next()
            .unwrap_or_default()
    }

    /// Decode the embedded bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.uri[self.data_offset..])?)
    }

    /// Intrinsic pixel dimensions `(width, height)` of the embedded image
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let bytes = self.decode()?;
        let dims = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(dims)
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl TryFrom<String> for ImagePayload {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ImagePayload> for String {
    fn from(payload: ImagePayload) -> Self {
        payload.uri
    }
}
