//! Batch processing command for multiple invoice PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use invx_core::models::invoice::{InvoiceDetails, InvoiceField};
use invx_core::pdf::TextLayout;
use invx_core::InvoicePipeline;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern (e.g. "invoices/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Directory for one JSON file per input (default: JSON lines on stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Text layout (default: from config, else simple)
    #[arg(short, long)]
    mode: Option<TextLayout>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    details: Option<InvoiceDetails>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// One line of stdout output when no output directory is given.
#[derive(Serialize)]
struct BatchLine<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a InvoiceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let pipeline = super::pipeline(&config, args.mode);

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(details) => {
                results.push(ProcessResult {
                    path,
                    details: Some(details),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        details: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    progress.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    // Write outputs
    for result in &results {
        match &args.output_dir {
            Some(output_dir) => {
                if let Some(details) = &result.details {
                    let output_path = output_dir.join(format!("{}.json", file_stem(&result.path)));
                    fs::write(&output_path, serde_json::to_string_pretty(details)?)?;
                    debug!("Wrote output to {}", output_path.display());
                }
            }
            None => {
                let line = BatchLine {
                    file: result.path.display().to_string(),
                    details: result.details.as_ref(),
                    error: result.error.as_deref(),
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: &Path, pipeline: &InvoicePipeline) -> anyhow::Result<InvoiceDetails> {
    Ok(pipeline.extract_file(path)?)
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(InvoiceField::ALL.map(InvoiceField::key));
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        let mut record = vec![filename];
        match &result.details {
            Some(details) => {
                record.push("success");
                record.extend(details.iter().map(|(_, value)| value.unwrap_or_default()));
                record.extend([time.as_str(), ""]);
            }
            None => {
                record.push("error");
                record.extend([""; 6]);
                record.extend([time.as_str(), result.error.as_deref().unwrap_or("")]);
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
