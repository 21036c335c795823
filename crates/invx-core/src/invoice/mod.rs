//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{extract, InvoiceParser, RegexInvoiceParser};

use crate::error::ExtractionError;
use crate::models::invoice::InvoiceDetails;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Outcome of extracting one document: the field values, or why there are none.
pub type ExtractionResult = Result<InvoiceDetails>;
