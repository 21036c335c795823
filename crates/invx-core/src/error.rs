//! Error types for the invx-core library.

use thiserror::Error;

/// Main error type for the invx library.
#[derive(Error, Debug)]
pub enum InvxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors reported in place of a field set.
///
/// These are the recoverable failures of an extraction; they never escape
/// the pipeline as panics and carry a message suitable for end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The document has zero pages.
    #[error("the PDF document is empty")]
    EmptyDocument,

    /// The last page produced no text (image-only scan, for example).
    #[error("could not extract text, the PDF might be image-based")]
    UnextractableText,

    /// The document could not be opened or parsed.
    #[error("an error occurred during PDF processing: {0}")]
    Parsing(String),
}

impl From<PdfError> for ExtractionError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::NoPages => ExtractionError::EmptyDocument,
            other => ExtractionError::Parsing(other.to_string()),
        }
    }
}

/// Result type for the invx library.
pub type Result<T> = std::result::Result<T, InvxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pages_maps_to_empty_document() {
        assert_eq!(
            ExtractionError::from(PdfError::NoPages),
            ExtractionError::EmptyDocument
        );
    }

    #[test]
    fn test_parse_failure_keeps_cause() {
        let err = ExtractionError::from(PdfError::Parse("bad xref".to_string()));
        assert_eq!(
            err.to_string(),
            "an error occurred during PDF processing: failed to parse PDF: bad xref"
        );
    }
}
