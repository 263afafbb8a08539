//! Single-page PDF packaging with `lopdf`

use crate::error::Result;
use crate::export::{DocumentPackager, Placement, fit_to_page_width};
use crate::payload::ImagePayload;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Page size in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width in millimetres
    pub width: f32,
    /// Page height in millimetres
    pub height: f32,
}

impl PageGeometry {
    /// ISO A4 portrait
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
    };
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Packages an image onto one page, spanning the page width from the top-left corner
#[derive(Debug, Clone, Default)]
pub struct PdfPackager {
    page: PageGeometry,
}

impl PdfPackager {
    /// Packager using the default A4 page
    pub fn new() -> Self {
        Self::default()
    }

    /// Packager using a custom page size
    pub fn with_page(page: PageGeometry) -> Self {
        Self { page }
    }

    /// Width of the default page in millimetres
    pub fn page_width(&self) -> f32 {
        self.page.width
    }

    /// Where `image` would be drawn, in millimetres from the top-left corner
    pub fn placement(&self, image: &ImagePayload) -> Result<Placement> {
        let (width, height) = image.dimensions()?;
        Ok(fit_to_page_width(width, height, self.page_width()))
    }

    fn build(&self, image: &DynamicImage, placement: Placement) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let (color_space, pixels) = if image.color().has_color() {
            ("DeviceRGB", image.to_rgb8().into_raw())
        } else {
            ("DeviceGray", image.to_luma8().into_raw())
        };
        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        };

        // Transparency travels as a separate grayscale soft mask.
        if image.color().has_alpha() {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
            let smask_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width() as i64,
                    "Height" => image.height() as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            ));
            image_dict.set("SMask", smask_id);
        }

        let image_id = doc.add_object(Stream::new(image_dict, pixels));

        let page_width = self.page.width * POINTS_PER_MM;
        let page_height = self.page.height * POINTS_PER_MM;
        let draw_width = placement.width * POINTS_PER_MM;
        let draw_height = placement.height * POINTS_PER_MM;
        let left = placement.x * POINTS_PER_MM;
        // PDF user space grows upwards from the bottom edge.
        let bottom = page_height - placement.y * POINTS_PER_MM - draw_height;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        draw_width.into(),
                        0.0f32.into(),
                        0.0f32.into(),
                        draw_height.into(),
                        left.into(),
                        bottom.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![
                0.0f32.into(),
                0.0f32.into(),
                page_width.into(),
                page_height.into(),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

impl DocumentPackager for PdfPackager {
    fn package(&self, image: &ImagePayload) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(&image.decode()?)?;
        let placement = fit_to_page_width(decoded.width(), decoded.height(), self.page_width());
        tracing::debug!(?placement, "Placing QR image on page");

        let mut doc = self.build(&decoded, placement)?;
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
