//! End-to-end extraction: PDF bytes in, invoice details out.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::invoice::{ExtractionResult, InvoiceParser, RegexInvoiceParser};
use crate::models::config::PdfConfig;
use crate::models::invoice::InvoiceDetails;
use crate::pdf::{
    reconstruct_columns, LinePrecision, PdfExtractor, PdfProcessor, Result, TextLayout,
    WordOptions,
};

/// Reads the last page of a PDF and runs the invoice field rules over it.
#[derive(Debug, Clone, Default)]
pub struct InvoicePipeline {
    layout: TextLayout,
    word_options: WordOptions,
    line_precision: LinePrecision,
}

impl InvoicePipeline {
    /// Pipeline with simple layout and default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from the `pdf` configuration section.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            layout: config.layout,
            word_options: config.word_options(),
            line_precision: config.line_precision(),
        }
    }

    /// Set how page text is linearized.
    pub fn with_layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set glyph grouping tolerances.
    pub fn with_word_options(mut self, options: WordOptions) -> Self {
        self.word_options = options;
        self
    }

    /// Set the line grouping tolerance used by the columns layout.
    pub fn with_line_precision(mut self, precision: LinePrecision) -> Self {
        self.line_precision = precision;
        self
    }

    /// Configured layout.
    pub fn layout(&self) -> TextLayout {
        self.layout
    }

    /// Text of the last page in the configured layout.
    pub fn page_text(&self, data: &[u8]) -> Result<String> {
        let mut extractor = PdfExtractor::new().with_word_options(self.word_options);
        extractor.load(data)?;

        let page = extractor.last_page()?;
        debug!(
            "Reading page {} of {} ({} layout)",
            page.number,
            extractor.page_count(),
            self.layout
        );

        match self.layout {
            TextLayout::Simple => extractor.extract_page_text(page.number),
            TextLayout::Columns => Ok(reconstruct_columns(
                &page.words,
                page.width,
                self.line_precision,
            )),
        }
    }

    /// Extract invoice details from a PDF file.
    ///
    /// I/O failures are reported separately from extraction failures.
    pub fn extract_file(&self, path: &Path) -> crate::Result<InvoiceDetails> {
        let data = fs::read(path)?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(self.extract(&data)?)
    }

    /// Extract invoice details from a PDF.
    pub fn extract(&self, data: &[u8]) -> ExtractionResult {
        let start = Instant::now();

        let text = self.page_text(data)?;
        let details = RegexInvoiceParser::new().parse(&text)?;

        info!(
            "Extracted {} fields from {} bytes in {}ms",
            details.found_count(),
            data.len(),
            start.elapsed().as_millis()
        );
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, InvxError};
    use crate::fixtures::{
        empty_pdf, single_column_invoice_pdf, two_column_invoice_pdf, PdfBuilder, TextRun,
    };
    use pretty_assertions::assert_eq;

    fn expected() -> InvoiceDetails {
        InvoiceDetails {
            gst_no: Some("29ABCDE1234F1Z5".to_string()),
            order_number: Some("405-1234567-8901234".to_string()),
            invoice_number: Some("IN-8812".to_string()),
            sold_by: Some("Acme Traders Pvt Ltd 12 Market Road, Bengaluru".to_string()),
            shipping_address: Some("Jane Doe 7 Lake View, Pune".to_string()),
            billing_address: Some("John Doe 221B Baker Street, Mumbai".to_string()),
        }
    }

    #[test]
    fn test_two_column_invoice_in_columns_layout() {
        let pipeline = InvoicePipeline::new().with_layout(TextLayout::Columns);
        assert_eq!(pipeline.extract(&two_column_invoice_pdf()), Ok(expected()));
    }

    #[test]
    fn test_single_column_invoice_in_simple_layout() {
        let pipeline = InvoicePipeline::new();
        assert_eq!(pipeline.extract(&single_column_invoice_pdf()), Ok(expected()));
    }

    #[test]
    fn test_columns_text_shape() {
        let pipeline = InvoicePipeline::new().with_layout(TextLayout::Columns);
        let text = pipeline.page_text(&two_column_invoice_pdf()).unwrap();

        let (left, right) = text.split_once("\n\n").unwrap();
        assert_eq!(left, "Sold By :\nAcme Traders Pvt Ltd\n12 Market Road, Bengaluru");
        assert!(right.starts_with("Billing Address :\nJohn Doe\n"));
        assert!(right.ends_with("Order Number: 405-1234567-8901234"));
    }

    #[test]
    fn test_simple_layout_interleaves_columns() {
        let text = InvoicePipeline::new()
            .page_text(&two_column_invoice_pdf())
            .unwrap();
        assert!(text.starts_with("Sold By : Billing Address :\n"));
    }

    #[test]
    fn test_only_last_page_is_read() {
        let details = InvoicePipeline::new()
            .extract(&single_column_invoice_pdf())
            .unwrap();
        assert_eq!(details.invoice_number.as_deref(), Some("IN-8812"));
        assert_ne!(details.gst_no.as_deref(), Some("DECOYGST"));
    }

    #[test]
    fn test_empty_document() {
        let result = InvoicePipeline::new().extract(&empty_pdf());
        assert_eq!(result, Err(ExtractionError::EmptyDocument));
    }

    #[test]
    fn test_blank_last_page_is_unextractable() {
        let data = PdfBuilder::new()
            .page(&[TextRun::new(40.0, 800.0, 10.0, "Invoice Number : IN-1")])
            .page(&[])
            .build();

        for layout in [TextLayout::Simple, TextLayout::Columns] {
            let result = InvoicePipeline::new().with_layout(layout).extract(&data);
            assert_eq!(result, Err(ExtractionError::UnextractableText), "{}", layout);
        }
    }

    #[test]
    fn test_garbage_is_parsing_error() {
        let result = InvoicePipeline::new().extract(b"%PDF-1.4 truncated");
        assert!(matches!(result, Err(ExtractionError::Parsing(_))));
    }

    #[test]
    fn test_extract_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, single_column_invoice_pdf()).unwrap();

        let pipeline = InvoicePipeline::new();
        assert_eq!(pipeline.extract_file(&path).unwrap(), expected());

        let missing = pipeline.extract_file(&dir.path().join("missing.pdf"));
        assert!(matches!(missing, Err(InvxError::Io(_))));

        std::fs::write(&path, empty_pdf()).unwrap();
        assert!(matches!(
            pipeline.extract_file(&path),
            Err(InvxError::Extraction(ExtractionError::EmptyDocument))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = PdfConfig {
            layout: TextLayout::Columns,
            x_tolerance: 1.5,
            y_tolerance: 2.0,
            line_precision: 0,
        };
        let pipeline = InvoicePipeline::from_config(&config);

        assert_eq!(pipeline.layout(), TextLayout::Columns);
        assert_eq!(pipeline.word_options.x_tolerance, 1.5);
        assert_eq!(pipeline.line_precision, LinePrecision::new(0));
    }
}
