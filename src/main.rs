//! qrform command-line entrypoint

use clap::Parser;
use qrform::form::{INVALID_URL_MESSAGE, PIXEL_SIZE_MAX, PIXEL_SIZE_MIN};
use qrform::{
    DirectorySink, Error, Exporter, GenerateOutcome, OutputFormat, PdfPackager, QrEncoder, QrForm,
    QrformConfig, Result, logging,
};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "qrform", version, about = "Turn a link into a QR code image or PDF")]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrform.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Link to encode
    #[arg(long, value_name = "TEXT", default_value = "")]
    url: String,

    /// Image width in pixels (advertised range 100-500, not enforced)
    #[arg(long, value_name = "PX")]
    size: Option<u32>,

    /// Download format (`image` or `document`/`pdf`)
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Directory downloads are written to
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Only validate the link and exit
    #[arg(long)]
    check: bool,

    /// Print the generated data URI instead of downloading
    #[arg(long)]
    print_data_uri: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = apply_cli_overrides(&cli, QrformConfig::load(cli.config.as_deref())?)?;
    logging::init(&config.logging)?;

    let mut stdout = io::stdout().lock();
    run(&cli, &config, &mut stdout).await
}

/// Command-line flags take precedence over the file and environment.
fn apply_cli_overrides(cli: &Cli, mut config: QrformConfig) -> Result<QrformConfig> {
    if let Some(size) = cli.size {
        config.form.pixel_size = size;
    }

    if let Some(ref format) = cli.format {
        config.form.format = format.parse::<OutputFormat>().map_err(Error::Config)?;
    }

    if let Some(ref dir) = cli.out_dir {
        config.form.output_dir = dir.clone();
    }

    Ok(config)
}

async fn run(cli: &Cli, config: &QrformConfig, out: &mut impl Write) -> Result<()> {
    let mut form = QrForm::new(Arc::new(QrEncoder::new()));
    form.set_url(cli.url.as_str());
    form.set_pixel_size(config.form.pixel_size);
    form.set_format(config.form.format);

    if !form.state().pixel_size_in_advertised_range() {
        warn!(
            size = config.form.pixel_size,
            "Size is outside {PIXEL_SIZE_MIN}-{PIXEL_SIZE_MAX}px; using it anyway"
        );
    }

    if cli.check {
        report_validity(&form, cli.json, out)?;
        return if form.state().is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidUrl(cli.url.clone()))
        };
    }

    if form.generate().await? == GenerateOutcome::Rejected {
        report_validity(&form, cli.json, out)?;
        return Err(Error::InvalidUrl(cli.url.clone()));
    }

    if cli.print_data_uri {
        if let Some(image) = form.state().generated_image() {
            if cli.json {
                writeln!(
                    out,
                    "{}",
                    serde_json::to_string_pretty(&json!({ "data_uri": image.as_str() }))?
                )?;
            } else {
                writeln!(out, "{image}")?;
            }
        }
        return Ok(());
    }

    let exporter = Exporter::new(
        Box::new(PdfPackager::new()),
        Box::new(DirectorySink::new(&config.form.output_dir)),
    )
    .with_file_names(
        config.form.image_file_name.clone(),
        config.form.document_file_name.clone(),
    );

    info!(label = ?form.state().download_label(), "Downloading");
    if let Some(saved) = form.download(&exporter)? {
        if cli.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&saved)?)?;
        } else {
            let location = saved
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| saved.file_name.clone());
            writeln!(out, "✓ Saved {location} ({} bytes)", saved.bytes)?;
        }
    }

    Ok(())
}

fn report_validity(form: &QrForm, json: bool, out: &mut impl Write) -> Result<()> {
    let state = form.state();
    if json {
        let payload = json!({
            "url": state.url_text(),
            "valid": state.is_valid(),
            "message": state.validation_message(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else if state.is_valid() {
        writeln!(out, "Valid URL: {}", state.url_text())?;
    } else {
        writeln!(out, "{INVALID_URL_MESSAGE}")?;
    }
    Ok(())
}
