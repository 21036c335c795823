//! Core library for regex-driven invoice field extraction.
//!
//! This crate provides:
//! - PDF processing (positioned text from the last page)
//! - Two-column text reconstruction
//! - Label-based field extraction (GST number, order and invoice numbers,
//!   seller, billing and shipping addresses)
//! - Configuration shared by the CLI and the HTTP server

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod pipeline;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{ExtractionError, InvxError, PdfError, Result};
pub use invoice::{extract, ExtractionResult, InvoiceParser, RegexInvoiceParser};
pub use models::config::{InvxConfig, PdfConfig, ServerConfig};
pub use models::invoice::{InvoiceDetails, InvoiceField};
pub use pdf::{LinePrecision, PdfExtractor, PdfProcessor, TextLayout, WordOptions};
pub use pipeline::InvoicePipeline;
