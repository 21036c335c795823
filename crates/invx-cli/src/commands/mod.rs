//! Subcommands of the `invx` binary.

pub mod batch;
pub mod config;
pub mod extract;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use invx_core::models::config::InvxConfig;
use invx_core::pdf::TextLayout;
use invx_core::InvoicePipeline;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invx")
        .join("config.json")
}

/// Load configuration from `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvxConfig> {
    let config = match config_path {
        Some(path) => InvxConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config file {}", path.display());
                InvxConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            } else {
                InvxConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Pipeline for the configured PDF settings, with an optional layout override.
pub fn pipeline(config: &InvxConfig, mode: Option<TextLayout>) -> InvoicePipeline {
    let pipeline = InvoicePipeline::from_config(&config.pdf);
    match mode {
        Some(layout) => pipeline.with_layout(layout),
        None => pipeline,
    }
}

/// Read an input PDF.
pub fn read_pdf(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
