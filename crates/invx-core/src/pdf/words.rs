//! Character to word grouping and linear text flow.

use super::{Char, Word};

/// Tolerances used when grouping glyphs into words and words into lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordOptions {
    /// Largest horizontal gap, in points, between two glyphs of one word.
    pub x_tolerance: f32,
    /// Largest vertical drift, in points, between items of one line.
    pub y_tolerance: f32,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// Group positioned glyphs into words.
///
/// Glyphs are clustered into lines by `top`, ordered left to right, and split
/// on whitespace glyphs or gaps wider than `x_tolerance`. Output is in
/// reading order.
pub fn words_from_chars(chars: &[Char], options: &WordOptions) -> Vec<Word> {
    let mut words = Vec::new();

    for line in cluster_lines(chars.iter().collect(), |c| c.top, options.y_tolerance) {
        let mut current: Option<Word> = None;

        for ch in line {
            let glyph: String = ch.text.chars().filter(|c| !c.is_whitespace()).collect();
            if glyph.is_empty() {
                words.extend(current.take());
                continue;
            }

            if let Some(word) = current.as_mut() {
                if ch.x0 - word.x1 > options.x_tolerance {
                    words.extend(current.take());
                } else {
                    word.text.push_str(&glyph);
                    word.x1 = word.x1.max(ch.x1);
                    word.top = word.top.min(ch.top);
                    word.bottom = word.bottom.max(ch.bottom);
                    continue;
                }
            }

            current = Some(Word {
                text: glyph,
                x0: ch.x0,
                x1: ch.x1,
                top: ch.top,
                bottom: ch.bottom,
            });
        }

        words.extend(current);
    }

    words
}

/// Lay words out as lines across the full page width.
///
/// Words whose `top` values chain within `y_tolerance` share a line; each
/// line is ordered left to right and joined with single spaces.
pub fn linear_text(words: &[Word], y_tolerance: f32) -> String {
    cluster_lines(words.iter().collect(), |w| w.top, y_tolerance)
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Horizontal position shared by chars and words.
trait Positioned {
    fn x0(&self) -> f32;
}

impl Positioned for Char {
    fn x0(&self) -> f32 {
        self.x0
    }
}

impl Positioned for Word {
    fn x0(&self) -> f32 {
        self.x0
    }
}

/// Cluster items into lines by vertical position, each sorted by `x0`.
fn cluster_lines<'a, T, F>(mut items: Vec<&'a T>, top: F, tolerance: f32) -> Vec<Vec<&'a T>>
where
    T: Positioned,
    F: Fn(&T) -> f32,
{
    items.sort_by(|a, b| top(a).total_cmp(&top(b)));

    let mut lines: Vec<Vec<&'a T>> = Vec::new();
    let mut last_top = f32::NEG_INFINITY;

    for item in items {
        let item_top = top(item);
        match lines.last_mut() {
            Some(line) if item_top - last_top <= tolerance => line.push(item),
            _ => lines.push(vec![item]),
        }
        last_top = item_top;
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
    }
    lines
}
