//! PDF processing module.
//!
//! Pages are read as positioned characters, grouped into words, and then
//! linearized either as a single flow (`simple`) or as two half-page
//! columns (`columns`).

mod columns;
mod extractor;
mod words;

pub use columns::{group_by_line, reconstruct_columns, LinePrecision, COLUMN_SEPARATOR};
pub use extractor::PdfExtractor;
pub use words::{linear_text, words_from_chars, WordOptions};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A single positioned glyph, in page space (origin top-left, points).
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
}

/// A positioned text token.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Token text, never containing whitespace.
    pub text: String,
    /// Left edge.
    pub x0: f32,
    /// Right edge.
    pub x1: f32,
    /// Distance from the top of the page to the top of the glyphs.
    pub top: f32,
    /// Distance from the top of the page to the bottom of the glyphs.
    pub bottom: f32,
}

impl Word {
    /// A zero-size word anchored at `(x0, top)`.
    pub fn new(text: impl Into<String>, x0: f32, top: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1: x0,
            top,
            bottom: top,
        }
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Words in reading order (top to bottom, left to right).
    pub words: Vec<Word>,
}

/// Strategy used to turn a page's words into plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLayout {
    /// One flow of lines across the full page width.
    #[default]
    Simple,
    /// Left half of the page, then right half.
    Columns,
}

impl fmt::Display for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextLayout::Simple => f.write_str("simple"),
            TextLayout::Columns => f.write_str("columns"),
        }
    }
}

impl FromStr for TextLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(TextLayout::Simple),
            "columns" => Ok(TextLayout::Columns),
            other => Err(format!("unknown text layout: {} (expected simple or columns)", other)),
        }
    }
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Read a page's words and geometry.
    fn page(&self, page: u32) -> Result<PdfPage>;

    /// Extract linear text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Read the last page of the document.
    fn last_page(&self) -> Result<PdfPage> {
        match self.page_count() {
            0 => Err(PdfError::NoPages),
            n => self.page(n),
        }
    }
}
