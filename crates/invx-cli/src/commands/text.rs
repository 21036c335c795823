//! Text command - print the last page of a PDF as plain text.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use invx_core::error::PdfError;
use invx_core::pdf::TextLayout;

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Text layout (default: from config, else simple)
    #[arg(short, long)]
    mode: Option<TextLayout>,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let pipeline = super::pipeline(&config, args.mode);

    info!("Reading {} ({} layout)", args.input.display(), pipeline.layout());
    let data = super::read_pdf(&args.input)?;

    // A document without pages prints as an empty line.
    let text = match pipeline.page_text(&data) {
        Ok(text) => text,
        Err(PdfError::NoPages) => String::new(),
        Err(e) => return Err(e.into()),
    };

    println!("{}", text);
    Ok(())
}
