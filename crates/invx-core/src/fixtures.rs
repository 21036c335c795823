//! Small PDF builder for tests.
//!
//! Pages use a single Courier font (600 units per glyph) so word positions
//! in generated documents are predictable: at size 10 every glyph is 6pt wide.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A4 portrait, in points.
pub const A4: (f32, f32) = (595.0, 842.0);

/// One line of text drawn at `(x, y)` in PDF coordinates (origin bottom-left).
#[derive(Debug, Clone)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

impl TextRun {
    pub fn new(x: f32, y: f32, size: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            size,
            text: text.into(),
        }
    }

    fn operations(&self) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), self.size.into()]),
            Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    self.x.into(),
                    self.y.into(),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal(self.text.as_str())]),
            Operation::new("ET", vec![]),
        ]
    }
}

/// Builds a PDF document page by page.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    width: f32,
    height: f32,
    pages: Vec<Vec<Operation>>,
}

impl PdfBuilder {
    /// A4 document with no pages.
    pub fn new() -> Self {
        Self::with_size(A4.0, A4.1)
    }

    /// Document whose pages share the given media box size.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
        }
    }

    /// Append a page drawing the given runs.
    pub fn page(mut self, runs: &[TextRun]) -> Self {
        self.pages
            .push(runs.iter().flat_map(TextRun::operations).collect());
        self
    }

    /// Append a page with a hand-written content stream. The font is `/F1`.
    pub fn raw_page(mut self, operations: Vec<Operation>) -> Self {
        self.pages.push(operations);
        self
    }

    /// Serialize the document.
    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
            "FirstChar" => Object::Integer(32),
            "LastChar" => Object::Integer(126),
            "Widths" => (32..=126).map(|_| Object::Integer(600)).collect::<Vec<_>>(),
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let data = content.encode().expect("fixture content encodes");
            let content_id = doc.add_object(Stream::new(dictionary! {}, data));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(self.width as i64),
                Object::Integer(self.height as i64),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("fixture document saves");
        buffer
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A document with zero pages.
pub fn empty_pdf() -> Vec<u8> {
    PdfBuilder::new().build()
}

/// Runs for an invoice page laid out in two columns.
///
/// The left column holds the seller block, the right column the billing and
/// shipping blocks followed by the identifiers. Read in simple mode the two
/// columns interleave line by line.
pub fn two_column_invoice_runs() -> Vec<TextRun> {
    let left = [
        "Sold By :",
        "Acme Traders Pvt Ltd",
        "12 Market Road, Bengaluru",
    ];
    let right = [
        "Billing Address :",
        "John Doe",
        "221B Baker Street, Mumbai",
        "PAN No: ABCDE1234F",
        "Shipping Address :",
        "Jane Doe",
        "7 Lake View, Pune",
        "State/UT Code: 27",
        "Invoice Number : IN-8812",
        "GST Registration No: 29ABCDE1234F1Z5",
        "Order Number: 405-1234567-8901234",
    ];

    let column = |x: f32, lines: &[&str]| -> Vec<TextRun> {
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| TextRun::new(x, 800.0 - 14.0 * i as f32, 10.0, *line))
            .collect()
    };

    let mut runs = column(40.0, &left);
    runs.extend(column(320.0, &right));
    runs
}

/// Runs for an invoice page with every label in a single column.
pub fn single_column_invoice_runs() -> Vec<TextRun> {
    [
        "Sold By :",
        "Acme Traders Pvt Ltd",
        "12 Market Road, Bengaluru",
        "Billing Address :",
        "John Doe",
        "221B Baker Street, Mumbai",
        "PAN No: ABCDE1234F",
        "Shipping Address :",
        "Jane Doe",
        "7 Lake View, Pune",
        "State/UT Code: 27",
        "Invoice Number : IN-8812",
        "GST Registration No: 29ABCDE1234F1Z5",
        "Order Number: 405-1234567-8901234",
    ]
    .iter()
    .enumerate()
    .map(|(i, line)| TextRun::new(40.0, 800.0 - 14.0 * i as f32, 10.0, *line))
    .collect()
}

/// A two-page document whose last page is a two-column invoice. The first
/// page carries decoy labels that must never be read.
pub fn two_column_invoice_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .page(&decoy_runs())
        .page(&two_column_invoice_runs())
        .build()
}

/// A two-page document whose last page is a single-column invoice.
pub fn single_column_invoice_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .page(&decoy_runs())
        .page(&single_column_invoice_runs())
        .build()
}

fn decoy_runs() -> Vec<TextRun> {
    vec![
        TextRun::new(40.0, 800.0, 10.0, "Invoice Number : DECOY-0001"),
        TextRun::new(40.0, 786.0, 10.0, "GST Registration No: DECOYGST"),
    ]
}
