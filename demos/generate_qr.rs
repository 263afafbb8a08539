//! Generate a QR code for a link and save it as PNG and PDF
//!
//! Usage: cargo run --example generate_qr -- [URL]

use qrform::{DirectorySink, Exporter, GenerateOutcome, OutputFormat, PdfPackager, QrEncoder, QrForm};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let mut form = QrForm::new(Arc::new(QrEncoder::new()));
    form.set_url(url.as_str());
    form.set_pixel_size(300);

    if form.generate().await? == GenerateOutcome::Rejected {
        anyhow::bail!("'{url}' does not look like a URL");
    }

    let exporter = Exporter::new(Box::new(PdfPackager::new()), Box::new(DirectorySink::new(".")));

    for format in [OutputFormat::Image, OutputFormat::Document] {
        form.set_format(format);
        if let Some(saved) = form.download(&exporter)? {
            println!("✓ {} saved to {}", format.label(), saved.file_name);
        }
    }

    Ok(())
}
