//! Configuration structures for the extraction pipeline and server.

use serde::{Deserialize, Serialize};

use crate::error::InvxError;
use crate::pdf::{LinePrecision, TextLayout, WordOptions};

/// Main configuration for invx.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvxConfig {
    /// PDF text configuration.
    pub pdf: PdfConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// PDF text configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// How page text is linearized before field matching.
    pub layout: TextLayout,

    /// Maximum horizontal gap between glyphs of the same word, in points.
    pub x_tolerance: f32,

    /// Maximum vertical drift between glyphs of the same line, in points.
    pub y_tolerance: f32,

    /// Decimal places the vertical offset is rounded to when grouping
    /// lines in columns mode.
    pub line_precision: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        let words = WordOptions::default();
        Self {
            layout: TextLayout::Simple,
            x_tolerance: words.x_tolerance,
            y_tolerance: words.y_tolerance,
            line_precision: LinePrecision::default().decimals(),
        }
    }
}

impl PdfConfig {
    /// Word grouping options derived from this configuration.
    pub fn word_options(&self) -> WordOptions {
        WordOptions {
            x_tolerance: self.x_tolerance,
            y_tolerance: self.y_tolerance,
        }
    }

    /// Line grouping tolerance for columns mode.
    pub fn line_precision(&self) -> LinePrecision {
        LinePrecision::new(self.line_precision)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,

    /// Number of extractions allowed to run at the same time.
    pub max_concurrent_extractions: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            max_upload_bytes: 10 << 20,
            max_concurrent_extractions: 10,
            request_timeout_secs: 30,
        }
    }
}

impl InvxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Check that values are usable.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(InvxError::Config(msg.to_string()));

        if !(self.pdf.x_tolerance >= 0.0 && self.pdf.y_tolerance >= 0.0) {
            return invalid("pdf tolerances must be non-negative numbers");
        }
        if self.server.max_upload_bytes == 0 {
            return invalid("server.max_upload_bytes must be greater than zero");
        }
        if self.server.max_concurrent_extractions == 0 {
            return invalid("server.max_concurrent_extractions must be greater than zero");
        }
        if self.server.request_timeout_secs == 0 {
            return invalid("server.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
