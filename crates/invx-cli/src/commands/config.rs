//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;

use invx_core::models::config::InvxConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

/// Settable configuration values, named by their path in the JSON file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum ConfigKey {
    #[value(name = "pdf.layout")]
    PdfLayout,
    #[value(name = "pdf.x_tolerance")]
    PdfXTolerance,
    #[value(name = "pdf.y_tolerance")]
    PdfYTolerance,
    #[value(name = "pdf.line_precision")]
    PdfLinePrecision,
    #[value(name = "server.bind")]
    ServerBind,
    #[value(name = "server.max_upload_bytes")]
    ServerMaxUploadBytes,
    #[value(name = "server.max_concurrent_extractions")]
    ServerMaxConcurrentExtractions,
    #[value(name = "server.request_timeout_secs")]
    ServerRequestTimeoutSecs,
}

impl ConfigKey {
    fn get(self, config: &InvxConfig) -> serde_json::Result<serde_json::Value> {
        let (pdf, server) = (&config.pdf, &config.server);
        match self {
            ConfigKey::PdfLayout => serde_json::to_value(pdf.layout),
            ConfigKey::PdfXTolerance => serde_json::to_value(pdf.x_tolerance),
            ConfigKey::PdfYTolerance => serde_json::to_value(pdf.y_tolerance),
            ConfigKey::PdfLinePrecision => serde_json::to_value(pdf.line_precision),
            ConfigKey::ServerBind => serde_json::to_value(&server.bind),
            ConfigKey::ServerMaxUploadBytes => serde_json::to_value(server.max_upload_bytes),
            ConfigKey::ServerMaxConcurrentExtractions => {
                serde_json::to_value(server.max_concurrent_extractions)
            }
            ConfigKey::ServerRequestTimeoutSecs => serde_json::to_value(server.request_timeout_secs),
        }
    }

    fn set(self, config: &mut InvxConfig, value: &str) -> anyhow::Result<()> {
        let (pdf, server) = (&mut config.pdf, &mut config.server);
        match self {
            ConfigKey::PdfLayout => pdf.layout = value.parse().map_err(anyhow::Error::msg)?,
            ConfigKey::PdfXTolerance => pdf.x_tolerance = value.parse()?,
            ConfigKey::PdfYTolerance => pdf.y_tolerance = value.parse()?,
            ConfigKey::PdfLinePrecision => pdf.line_precision = value.parse()?,
            ConfigKey::ServerBind => server.bind = value.to_string(),
            ConfigKey::ServerMaxUploadBytes => server.max_upload_bytes = value.parse()?,
            ConfigKey::ServerMaxConcurrentExtractions => {
                server.max_concurrent_extractions = value.parse()?
            }
            ConfigKey::ServerRequestTimeoutSecs => server.request_timeout_secs = value.parse()?,
        }
        Ok(())
    }

    fn name(self) -> String {
        use clap::ValueEnum;
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default()
    }
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_config(&path, key),
        ConfigCommand::Set { key, value } => set_config(&path, key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn load_or_default(config_path: &Path) -> anyhow::Result<InvxConfig> {
    if config_path.exists() {
        Ok(InvxConfig::from_file(config_path)?)
    } else {
        Ok(InvxConfig::default())
    }
}

fn show_config(config_path: &Path) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        InvxConfig::from_file(config_path)?
    } else {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
        InvxConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(default_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = InvxConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(config_path: &Path, key: ConfigKey) -> anyhow::Result<()> {
    let config = load_or_default(config_path)?;
    println!("{}", serde_json::to_string_pretty(&key.get(&config)?)?);

    Ok(())
}

fn set_config(config_path: &Path, key: ConfigKey, value: &str) -> anyhow::Result<()> {
    let mut config = load_or_default(config_path)?;

    key.set(&mut config, value)
        .with_context(|| format!("Invalid value for {}: {}", key.name(), value))?;
    config.validate()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key.name(),
        serde_json::to_string(&key.get(&config)?)?
    );

    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'invx config init' to create a configuration file.");
    }

    Ok(())
}
