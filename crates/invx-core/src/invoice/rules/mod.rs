//! Rule-based field extractors for invoice labels.

pub mod patterns;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::invoice::InvoiceField;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// How a captured group is turned into a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// The capture is a single non-whitespace token, used as is.
    Token,
    /// Surrounding whitespace is removed.
    Trimmed,
    /// A multi-line block joined into one line with single spaces.
    CollapseLines,
}

impl PostProcess {
    /// Apply to a captured group. Empty results are `None`.
    pub fn apply(self, captured: &str) -> Option<String> {
        let value = match self {
            PostProcess::Token => captured.to_string(),
            PostProcess::Trimmed => captured.trim().to_string(),
            PostProcess::CollapseLines => collapse_lines(captured),
        };
        (!value.trim().is_empty()).then_some(value)
    }
}

/// Join the lines of a block with single spaces.
///
/// Each line is trimmed and blank lines are dropped, so padding left over
/// from layout reconstruction never leaks into the value.
pub fn collapse_lines(block: &str) -> String {
    block
        .trim()
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Field the rule fills.
    pub field: InvoiceField,
    /// Pattern searched for anywhere in the text; the first match wins.
    pub pattern: &'static Regex,
    /// Capture group holding the value.
    pub group: usize,
    /// Transformation applied to the captured group.
    pub post: PostProcess,
}

impl FieldExtractor for FieldRule {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        // Only the leftmost match counts, even when its value is empty.
        let caps = self.pattern.captures(text)?;
        self.post.apply(caps.get(self.group)?.as_str())
    }
}

lazy_static! {
    /// Extraction rules, one per invoice field.
    pub static ref FIELD_RULES: [FieldRule; 6] = [
        FieldRule {
            field: InvoiceField::GstNo,
            pattern: &patterns::GST_NO,
            group: 1,
            post: PostProcess::Token,
        },
        FieldRule {
            field: InvoiceField::OrderNumber,
            pattern: &patterns::ORDER_NUMBER,
            group: 1,
            post: PostProcess::Trimmed,
        },
        FieldRule {
            field: InvoiceField::InvoiceNumber,
            pattern: &patterns::INVOICE_NUMBER,
            group: 1,
            post: PostProcess::Token,
        },
        FieldRule {
            field: InvoiceField::SoldBy,
            pattern: &patterns::SOLD_BY,
            group: 1,
            post: PostProcess::CollapseLines,
        },
        FieldRule {
            field: InvoiceField::ShippingAddress,
            pattern: &patterns::SHIPPING_ADDRESS,
            group: 1,
            post: PostProcess::CollapseLines,
        },
        FieldRule {
            field: InvoiceField::BillingAddress,
            pattern: &patterns::BILLING_ADDRESS,
            group: 1,
            post: PostProcess::CollapseLines,
        },
    ];
}

/// Rule for a field.
pub fn rule_for(field: InvoiceField) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|rule| rule.field == field)
}
