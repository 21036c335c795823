//! Extract command - pull invoice fields from a single PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invx_core::models::invoice::{InvoiceDetails, InvoiceField};
use invx_core::pdf::TextLayout;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Text layout (default: from config, else simple)
    #[arg(short, long)]
    mode: Option<TextLayout>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let pipeline = super::pipeline(&config, args.mode);

    info!("Processing file: {}", args.input.display());
    let data = super::read_pdf(&args.input)?;

    let details = pipeline.extract(&data)?;
    let output = format_details(&details, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_details(details: &InvoiceDetails, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(details)?),
        OutputFormat::Csv => format_csv(details),
        OutputFormat::Text => Ok(format_text(details)),
    }
}

fn format_csv(details: &InvoiceDetails) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(InvoiceField::ALL.map(InvoiceField::key))?;
    wtr.write_record(details.iter().map(|(_, value)| value.unwrap_or_default()))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(details: &InvoiceDetails) -> String {
    let width = InvoiceField::ALL
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (field, value) in details.iter() {
        output.push_str(&format!(
            "{:<width$}  {}\n",
            field.label(),
            value.unwrap_or("-"),
            width = width
        ));
    }
    output
}
