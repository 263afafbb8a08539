//! Saving generated QR images as raster files or single-page documents

pub mod pdf;
pub mod sink;

pub use pdf::{PageGeometry, PdfPackager};
pub use sink::DirectorySink;

use crate::error::Result;
use crate::payload::ImagePayload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default file name for raster downloads
pub const IMAGE_FILE_NAME: &str = "qrcode.png";
/// Default file name for document downloads
pub const DOCUMENT_FILE_NAME: &str = "qrcode.pdf";

/// Output format chosen on the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw raster image
    #[default]
    Image,
    /// Single-page document embedding the image
    #[serde(alias = "pdf")]
    Document,
}

impl OutputFormat {
    /// Parse a format identifier (case-insensitive); `pdf` is accepted for documents.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" | "png" => Some(Self::Image),
            "document" | "pdf" => Some(Self::Document),
            _ => None,
        }
    }

    /// Label used on the download action
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Document => "Document",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| format!("Unsupported output format '{value}', expected 'image' or 'document'"))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Position and size of an image on a page, in page units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Horizontal offset from the page's left edge
    pub x: f32,
    /// Vertical offset from the page's top edge
    pub y: f32,
    /// Drawn width
    pub width: f32,
    /// Drawn height
    pub height: f32,
}

/// Place an image at the page origin spanning the full page width,
/// scaling its height to keep the aspect ratio.
pub fn fit_to_page_width(image_width: u32, image_height: u32, page_width: f32) -> Placement {
    let height = if image_width == 0 {
        0.0
    } else {
        (image_height as f32 * page_width) / image_width as f32
    };
    Placement {
        x: 0.0,
        y: 0.0,
        width: page_width,
        height,
    }
}

/// Capability that assembles an image into a document file
pub trait DocumentPackager: Send + Sync {
    /// Build the serialized document around `image`
    fn package(&self, image: &ImagePayload) -> Result<Vec<u8>>;
}

/// Record of a completed save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// File name the contents were saved under
    pub file_name: String,
    /// Location on disk, when the target writes to a filesystem
    pub path: Option<PathBuf>,
    /// Number of bytes written
    pub bytes: usize,
}

/// Capability that persists downloaded contents under a file name
pub trait SaveTarget: Send + Sync {
    /// Save `contents` as `file_name`
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<SavedFile>;
}

/// Routes an image payload to the save target in the requested format
pub struct Exporter {
    packager: Box<dyn DocumentPackager>,
    target: Box<dyn SaveTarget>,
    image_file_name: String,
    document_file_name: String,
}

impl Exporter {
    /// Create an exporter using the default file names
    pub fn new(packager: Box<dyn DocumentPackager>, target: Box<dyn SaveTarget>) -> Self {
        Self {
            packager,
            target,
            image_file_name: IMAGE_FILE_NAME.to_string(),
            document_file_name: DOCUMENT_FILE_NAME.to_string(),
        }
    }

    /// Override the file names used for each format
    pub fn with_file_names(
        mut self,
        image_file_name: impl Into<String>,
        document_file_name: impl Into<String>,
    ) -> Self {
        self.image_file_name = image_file_name.into();
        self.document_file_name = document_file_name.into();
        self
    }

    /// File name a download in `format` would be saved under
    pub fn file_name(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Image => &self.image_file_name,
            OutputFormat::Document => &self.document_file_name,
        }
    }

    /// Save `image` in `format`. Packaging failures are returned as-is.
    pub fn export(&self, image: &ImagePayload, format: OutputFormat) -> Result<SavedFile> {
        let contents = match format {
            OutputFormat::Image => image.decode()?,
            OutputFormat::Document => self.packager.package(image)?,
        };

        let saved = self.target.save(self.file_name(format), &contents)?;
        tracing::info!(
            format = %format,
            file = %saved.file_name,
            bytes = saved.bytes,
            "Saved QR code"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<(String, Vec<u8>)>>>);

    impl SaveTarget for Recorder {
        fn save(&self, file_name: &str, contents: &[u8]) -> Result<SavedFile> {
            self.0
                .lock()
                .unwrap()
                .push((file_name.to_string(), contents.to_vec()));
            Ok(SavedFile {
                file_name: file_name.to_string(),
                path: None,
                bytes: contents.len(),
            })
        }
    }

    struct Failing;

    impl DocumentPackager for Failing {
        fn package(&self, _image: &ImagePayload) -> Result<Vec<u8>> {
            Err(Error::Document("boom".to_string()))
        }
    }

    fn payload() -> ImagePayload {
        ImagePayload::parse("data:image/png;base64,AAAA").unwrap()
    }

    #[test]
    fn test_fit_square_image_to_page_width() {
        let placement = fit_to_page_width(300, 300, 210.0);
        assert_eq!(
            placement,
            Placement {
                x: 0.0,
                y: 0.0,
                width: 210.0,
                height: 210.0
            }
        );
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let placement = fit_to_page_width(400, 200, 210.0);
        assert_eq!(placement.width, 210.0);
        assert_eq!(placement.height, 105.0);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::parse("Image"), Some(OutputFormat::Image));
        assert_eq!(OutputFormat::parse("PDF"), Some(OutputFormat::Document));
        assert_eq!(OutputFormat::parse("document"), Some(OutputFormat::Document));
        assert!("svg".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Image);
        assert_eq!(OutputFormat::Document.label(), "Document");
    }

    #[test]
    fn test_image_export_saves_raw_bytes() {
        let recorder = Recorder::default();
        let exporter = Exporter::new(Box::new(Failing), Box::new(recorder.clone()));

        let saved = exporter.export(&payload(), OutputFormat::Image).unwrap();
        assert_eq!(saved.file_name, "qrcode.png");

        let saves = recorder.0.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0], ("qrcode.png".to_string(), vec![0, 0, 0]));
    }

    #[test]
    fn test_packaging_failure_propagates_without_save() {
        let recorder = Recorder::default();
        let exporter = Exporter::new(Box::new(Failing), Box::new(recorder.clone()))
            .with_file_names("a.png", "b.pdf");

        let err = exporter.export(&payload(), OutputFormat::Document).unwrap_err();
        assert!(matches!(err, Error::Document(_)));
        assert!(recorder.0.lock().unwrap().is_empty());
        assert_eq!(exporter.file_name(OutputFormat::Document), "b.pdf");
    }
}
