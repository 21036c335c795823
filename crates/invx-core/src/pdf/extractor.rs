//! PDF text extraction using lopdf, with pdf-extract as a fallback.
//!
//! Pages are interpreted operator by operator to recover where each glyph is
//! drawn. Only text-related state is tracked: the CTM, the text and line
//! matrices, and the text state parameters.

use std::collections::BTreeMap;
use std::panic;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::words::{linear_text, words_from_chars, WordOptions};
use super::{Char, PdfPage, PdfProcessor, Result};
use crate::error::PdfError;

/// Affine matrix `[a, b, c, d, e, f]`.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Nesting limit for form XObjects drawn from other forms.
const MAX_FORM_DEPTH: usize = 8;

/// Nesting limit when walking the page tree for inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Glyph width, in thousandths of text space, used when a font has no widths.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    word_options: WordOptions,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            word_options: WordOptions::default(),
        }
    }

    /// Set the tolerances used to group glyphs into words and lines.
    pub fn with_word_options(mut self, options: WordOptions) -> Self {
        self.word_options = options;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Page text as seen by pdf-extract, used when positional reading finds
    /// nothing.
    fn fallback_page_text(&self, page: u32) -> Option<String> {
        let data = self.raw_data.as_slice();
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
            Ok(Ok(pages)) => pages
                .into_iter()
                .nth(page.saturating_sub(1) as usize)
                .map(|text| text.trim().to_string()),
            Ok(Err(e)) => {
                warn!("pdf-extract failed on page {}: {}", page, e);
                None
            }
            Err(_) => {
                warn!("pdf-extract panicked on page {}", page);
                None
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page(&self, page: u32) -> Result<PdfPage> {
        let doc = self.document()?;
        let page_id = page_id(doc, page)?;
        let bounds = media_box(doc, page_id);

        let chars = read_page_chars(doc, page_id, bounds)?;
        let words = words_from_chars(&chars, &self.word_options);
        debug!(
            "Page {}: {}x{}pt, {} glyphs, {} words",
            page,
            bounds.width(),
            bounds.height(),
            chars.len(),
            words.len()
        );

        Ok(PdfPage {
            number: page,
            width: bounds.width(),
            height: bounds.height(),
            words,
        })
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let words = self.page(page)?.words;
        let text = linear_text(&words, self.word_options.y_tolerance);
        if !text.trim().is_empty() {
            return Ok(text);
        }

        debug!("No positioned text on page {}, trying pdf-extract", page);
        Ok(self.fallback_page_text(page).unwrap_or(text))
    }
}

fn page_id(doc: &Document, page: u32) -> Result<ObjectId> {
    doc.get_pages()
        .get(&page)
        .copied()
        .ok_or(PdfError::InvalidPage(page))
}

fn read_page_chars(doc: &Document, page_id: ObjectId, bounds: MediaBox) -> Result<Vec<Char>> {
    let resources = inherited(doc, page_id, b"Resources")
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_dict().ok());

    let content = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

    let mut reader = PageReader {
        doc,
        bounds,
        chars: Vec::new(),
    };
    reader.read(&content, resources, IDENTITY, 0)?;
    Ok(reader.chars)
}

/// Look up a page attribute, following `/Parent` links for inherited values.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Resolve `dict[key]` to a dictionary, following one reference.
fn sub_dictionary<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    let obj = dict.get(key).ok()?;
    let (_, obj) = doc.dereference(obj).ok()?;
    obj.as_dict().ok()
}

/// Page bounds in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MediaBox {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl MediaBox {
    const US_LETTER: MediaBox = MediaBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    fn from_array(values: &[Object]) -> Option<Self> {
        let [ax, ay, bx, by] = values else {
            return None;
        };
        let (ax, ay, bx, by) = (number(ax)?, number(ay)?, number(bx)?, number(by)?);
        Some(Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        })
    }

    fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> MediaBox {
    inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_array().ok())
        .and_then(|values| MediaBox::from_array(values))
        .unwrap_or_else(|| {
            trace!("No usable MediaBox, assuming US Letter");
            MediaBox::US_LETTER
        })
}

/// Helper to get f32 from Object
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn matrix(values: &[Object]) -> Option<Matrix> {
    if values.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, value) in m.iter_mut().zip(values) {
        *slot = number(value)?;
    }
    Some(m)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Pre-multiply `m` by a translation of `(tx, ty)`.
fn translate(m: &mut Matrix, tx: f32, ty: f32) {
    m[4] += tx * m[0] + ty * m[2];
    m[5] += tx * m[1] + ty * m[3];
}

/// A decoded glyph with its advance width in thousandths of text space.
struct Glyph {
    text: String,
    width: f32,
    is_space: bool,
}

/// Font data needed to decode strings and advance the text position.
struct FontInfo<'a> {
    encoding: Option<Encoding<'a>>,
    first_char: i64,
    widths: Vec<f32>,
    default_width: f32,
    two_byte: bool,
}

impl<'a> FontInfo<'a> {
    fn new(doc: &'a Document, dict: &'a Dictionary) -> Self {
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|obj| doc.dereference(obj).ok())
            .and_then(|(_, obj)| obj.as_array().ok())
            .map(|values| values.iter().map(|w| number(w).unwrap_or(0.0)).collect())
            .unwrap_or_default();

        let default_width = if name_of(dict, b"BaseFont").starts_with(b"Courier") {
            600.0
        } else {
            DEFAULT_GLYPH_WIDTH
        };

        Self {
            encoding: dict.get_font_encoding(doc).ok(),
            first_char: dict.get(b"FirstChar").and_then(|o| o.as_i64()).unwrap_or(0),
            widths,
            default_width,
            two_byte: name_of(dict, b"Subtype") == b"Type0",
        }
    }

    /// Used when a string is shown with a font missing from the resources.
    fn unknown() -> Self {
        Self {
            encoding: None,
            first_char: 0,
            widths: Vec::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
            two_byte: false,
        }
    }

    fn width(&self, code: u8) -> f32 {
        let index = i64::from(code) - self.first_char;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.widths.get(i))
            .copied()
            .unwrap_or(self.default_width)
    }

    fn decode(&self, bytes: &[u8]) -> Option<String> {
        Document::decode_text(self.encoding.as_ref()?, bytes)
            .ok()
            .filter(|text| !text.is_empty())
    }

    fn glyphs(&self, bytes: &[u8]) -> Vec<Glyph> {
        if !self.two_byte {
            return bytes
                .iter()
                .map(|&b| Glyph {
                    text: self
                        .decode(&[b])
                        .unwrap_or_else(|| char::from(b).to_string()),
                    width: self.width(b),
                    is_space: b == b' ',
                })
                .collect();
        }

        let codes = bytes.len().div_ceil(2);
        let text = self
            .decode(bytes)
            .unwrap_or_else(|| fallback_decode(bytes));
        let chars: Vec<char> = text.chars().collect();

        if chars.is_empty() {
            // Nothing printable, but the pen still moves.
            return vec![Glyph {
                text: String::new(),
                width: self.default_width * codes as f32,
                is_space: false,
            }];
        }

        let width = self.default_width * codes as f32 / chars.len() as f32;
        chars
            .into_iter()
            .map(|c| Glyph {
                text: c.to_string(),
                width,
                is_space: false,
            })
            .collect()
    }
}

fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> &'a [u8] {
    dict.get(key).and_then(|o| o.as_name()).unwrap_or_default()
}

/// UTF-16BE with BOM, else Latin-1.
fn fallback_decode(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn load_fonts<'a>(doc: &'a Document, resources: Option<&'a Dictionary>) -> BTreeMap<Vec<u8>, FontInfo<'a>> {
    let mut fonts = BTreeMap::new();
    let Some(font_dict) = resources.and_then(|r| sub_dictionary(doc, r, b"Font")) else {
        return fonts;
    };

    for (name, obj) in font_dict.iter() {
        if let Ok((_, Object::Dictionary(font))) = doc.dereference(obj) {
            fonts.insert(name.clone(), FontInfo::new(doc, font));
        }
    }
    fonts
}

/// Graphics and text state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Collects positioned glyphs from one page.
struct PageReader<'a> {
    doc: &'a Document,
    bounds: MediaBox,
    chars: Vec<Char>,
}

impl<'a> PageReader<'a> {
    fn read(
        &mut self,
        data: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        let fonts = load_fonts(self.doc, resources);
        let unknown_font = FontInfo::unknown();

        let mut state = GraphicsState::new(ctm);
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = IDENTITY;
        let mut line_matrix = IDENTITY;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            let font = fonts.get(&state.font).unwrap_or(&unknown_font);

            match op.operator.as_str() {
                "q" => saved.push(state.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        state = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix(operands) {
                        state.ctm = multiply(&m, &state.ctm);
                    }
                }
                "BT" => {
                    text_matrix = IDENTITY;
                    line_matrix = IDENTITY;
                }
                "Tf" => {
                    if let [name, size, ..] = operands {
                        if let Ok(name) = name.as_name() {
                            state.font = name.to_vec();
                        }
                        if let Some(size) = number(size) {
                            state.font_size = size;
                        }
                    }
                }
                "Tc" => set_number(&mut state.char_spacing, operands),
                "Tw" => set_number(&mut state.word_spacing, operands),
                "TL" => set_number(&mut state.leading, operands),
                "Ts" => set_number(&mut state.rise, operands),
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(number) {
                        state.h_scale = scale / 100.0;
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands {
                        let (tx, ty) = (number(tx).unwrap_or(0.0), number(ty).unwrap_or(0.0));
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        translate(&mut line_matrix, tx, ty);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix(operands) {
                        text_matrix = m;
                        line_matrix = m;
                    }
                }
                "T*" => {
                    translate(&mut line_matrix, 0.0, -state.leading);
                    text_matrix = line_matrix;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, font, &state, &mut text_matrix);
                    }
                }
                "'" | "\"" => {
                    let text = if op.operator == "\"" {
                        if let [aw, ac, ..] = operands {
                            state.word_spacing = number(aw).unwrap_or(state.word_spacing);
                            state.char_spacing = number(ac).unwrap_or(state.char_spacing);
                        }
                        operands.get(2)
                    } else {
                        operands.first()
                    };
                    translate(&mut line_matrix, 0.0, -state.leading);
                    text_matrix = line_matrix;
                    if let Some(Object::String(bytes, _)) = text {
                        self.show(bytes, font, &state, &mut text_matrix);
                    }
                }
                "TJ" => {
                    if let Some(Ok(items)) = operands.first().map(|o| o.as_array()) {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show(bytes, font, &state, &mut text_matrix)
                                }
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0 * state.font_size * state.h_scale;
                                        translate(&mut text_matrix, tx, 0.0);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_form(name, resources, state.ctm, depth);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn show(&mut self, bytes: &[u8], font: &FontInfo<'_>, state: &GraphicsState, text_matrix: &mut Matrix) {
        let scale = [
            state.font_size * state.h_scale,
            0.0,
            0.0,
            state.font_size,
            0.0,
            state.rise,
        ];

        for glyph in font.glyphs(bytes) {
            if !glyph.text.is_empty() {
                let rendering = multiply(&scale, &multiply(text_matrix, &state.ctm));
                let advance = glyph.width / 1000.0 * rendering[0].hypot(rendering[1]);
                let size = rendering[2].hypot(rendering[3]);

                let x0 = rendering[4] - self.bounds.x0;
                let bottom = self.bounds.y1 - rendering[5];
                self.chars.push(Char {
                    text: glyph.text,
                    x0,
                    x1: x0 + advance,
                    top: bottom - size,
                    bottom,
                });
            }

            let mut tx = glyph.width / 1000.0 * state.font_size + state.char_spacing;
            if glyph.is_space {
                tx += state.word_spacing;
            }
            translate(text_matrix, tx * state.h_scale, 0.0);
        }
    }

    /// Interpret a form XObject in place. Images and broken forms are skipped.
    fn draw_form(&mut self, name: &[u8], resources: Option<&'a Dictionary>, ctm: Matrix, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            trace!("Form nesting limit reached, skipping /{}", String::from_utf8_lossy(name));
            return;
        }

        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| sub_dictionary(doc, r, b"XObject"))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| doc.dereference(obj).ok())
            .and_then(|(_, obj)| obj.as_stream().ok())
        else {
            return;
        };

        if stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok() != Some(b"Form".as_slice()) {
            return;
        }

        let form_matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| m.as_array().ok())
            .and_then(|values| matrix(values))
            .unwrap_or(IDENTITY);
        let form_resources = sub_dictionary(doc, &stream.dict, b"Resources").or(resources);
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        if let Err(e) = self.read(&data, form_resources, multiply(&form_matrix, &ctm), depth + 1) {
            debug!("Skipping unreadable form /{}: {}", String::from_utf8_lossy(name), e);
        }
    }
}

fn set_number(slot: &mut f32, operands: &[Object]) {
    if let Some(value) = operands.first().and_then(number) {
        *slot = value;
    }
}
