//! Print the text of a PDF's last page.
//!
//! `pdf-text <file.pdf> [--mode=simple|columns]`

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use invx_core::error::PdfError;
use invx_core::pdf::TextLayout;
use invx_core::InvoicePipeline;

/// Dump the last page of a PDF as plain text
#[derive(Parser)]
#[command(name = "pdf-text")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input PDF file
    file: PathBuf,

    /// Text layout
    #[arg(long, default_value_t = TextLayout::Simple)]
    mode: TextLayout,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data = fs::read(&cli.file).with_context(|| format!("Failed to read {}", cli.file.display()))?;

    // A document without pages prints as an empty line.
    let text = match InvoicePipeline::new().with_layout(cli.mode).page_text(&data) {
        Ok(text) => text,
        Err(PdfError::NoPages) => String::new(),
        Err(e) => return Err(e.into()),
    };

    println!("{}", text);
    Ok(())
}
