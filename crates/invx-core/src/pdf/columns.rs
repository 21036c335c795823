//! Two-column text reconstruction.

use std::collections::BTreeMap;

use super::Word;

/// Separator placed between the left and right column blocks.
pub const COLUMN_SEPARATOR: &str = "\n\n";

/// Tolerance used to decide that two words share a printed line.
///
/// Vertical offsets are rounded to this many decimal places; words whose
/// rounded offsets collide end up on the same line. One decimal place
/// absorbs sub-point jitter from renderers that emit each word with its own
/// text matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrecision(u32);

impl LinePrecision {
    /// Round vertical offsets to `decimals` places.
    pub fn new(decimals: u32) -> Self {
        // 10^9 still fits comfortably in the i64 key range for page coordinates.
        Self(decimals.min(9))
    }

    /// Number of decimal places.
    pub fn decimals(self) -> u32 {
        self.0
    }

    /// Bucket key for a vertical offset. Exact halves round to even.
    fn key(self, top: f32) -> i64 {
        let scale = 10f64.powi(self.0 as i32);
        (f64::from(top) * scale).round_ties_even() as i64
    }
}

impl Default for LinePrecision {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Group words into lines by rounded vertical offset.
///
/// Lines come back top to bottom; words within a line left to right. Words
/// with equal `x0` keep their input order.
pub fn group_by_line<'a, I>(words: I, precision: LinePrecision) -> Vec<Vec<&'a Word>>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut lines: BTreeMap<i64, Vec<&'a Word>> = BTreeMap::new();
    for word in words {
        lines.entry(precision.key(word.top)).or_default().push(word);
    }

    lines
        .into_values()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            line
        })
        .collect()
}

/// Rebuild page text as a left column block followed by a right column block.
///
/// Words starting strictly left of `page_width / 2` belong to the left
/// column, everything else to the right. Each column is grouped into lines
/// with [`group_by_line`], words joined by a space and lines by a newline.
/// The two blocks are joined by [`COLUMN_SEPARATOR`], so an empty word list
/// yields the separator alone.
pub fn reconstruct_columns(words: &[Word], page_width: f32, precision: LinePrecision) -> String {
    let mid_x = page_width / 2.0;
    let (left, right): (Vec<&Word>, Vec<&Word>) = words.iter().partition(|w| w.x0 < mid_x);

    let left_text = render_lines(&group_by_line(left, precision));
    let right_text = render_lines(&group_by_line(right, precision));

    let mut text = String::with_capacity(left_text.len() + right_text.len() + COLUMN_SEPARATOR.len());
    text.push_str(&left_text);
    text.push_str(COLUMN_SEPARATOR);
    text.push_str(&right_text);
    text
}

fn render_lines(lines: &[Vec<&Word>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
