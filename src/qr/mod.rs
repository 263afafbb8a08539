//! QR code generation
//!
//! The form controller only knows the [`Encoder`] capability: given text and
//! a target pixel width, produce an image payload or fail. [`QrEncoder`] is
//! the default implementation backed by the `qrcode` crate.

mod encoder;

pub use encoder::QrEncoder;

use crate::error::Result;
use crate::payload::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Rendering options passed to an [`Encoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Target image width in pixels
    pub width: u32,
}

/// Capability that turns text into a scannable QR image
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode `text` into an image payload
    async fn encode(&self, text: &str, options: EncodeOptions) -> Result<ImagePayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Encoder for Echo {
        async fn encode(&self, _text: &str, options: EncodeOptions) -> Result<ImagePayload> {
            assert_eq!(options.width, 321);
            ImagePayload::parse("data:image/png;base64,AAAA")
        }
    }

    #[tokio::test]
    async fn test_encoder_is_object_safe() {
        let encoder: Box<dyn Encoder> = Box::new(Echo);
        let payload = encoder
            .encode("example.com", EncodeOptions { width: 321 })
            .await
            .unwrap();
        assert_eq!(payload.as_str(), "data:image/png;base64,AAAA");
    }
}
