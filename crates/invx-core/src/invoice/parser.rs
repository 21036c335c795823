//! Regex invoice parser driven by the field rule table.

use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::invoice::InvoiceDetails;

use super::rules::{FieldExtractor, FieldRule, FIELD_RULES};
use super::{ExtractionResult, Result};

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice details from page text.
    fn parse(&self, text: &str) -> Result<InvoiceDetails>;
}

/// Parser that applies a fixed set of label rules to the page text.
pub struct RegexInvoiceParser {
    rules: &'static [FieldRule],
}

impl RegexInvoiceParser {
    /// Create a parser over the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: &FIELD_RULES[..],
        }
    }
}

impl Default for RegexInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RegexInvoiceParser {
    fn parse(&self, text: &str) -> Result<InvoiceDetails> {
        if text.trim().is_empty() {
            return Err(ExtractionError::UnextractableText);
        }

        debug!("Parsing invoice from {} characters of text", text.len());

        let mut details = InvoiceDetails::default();
        for rule in self.rules {
            let found = rule.extract(text);
            trace!("{}: {:?}", rule.field, found);
            details.set(rule.field, found);
        }

        debug!("Extracted {} of {} fields", details.found_count(), self.rules.len());
        Ok(details)
    }
}

/// Extract invoice details from page text with the built-in rules.
pub fn extract(text: &str) -> ExtractionResult {
    RegexInvoiceParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceField;
    use pretty_assertions::assert_eq;

    const FULL_INVOICE: &str = "\
Sold By : ABC Corp
123 Street
City
Billing Address : John Doe
456 Ave
PAN No: ABCDE1234F
Shipping Address : Jane
789 Rd
State/UT Code: 29
Invoice Number : IN-001
GST Registration No: 29ABCDE1234F1Z5
Order Number: 123-4567890-1234567";

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_parse_full_invoice() {
        let details = extract(FULL_INVOICE).unwrap();

        assert_eq!(
            details,
            InvoiceDetails {
                gst_no: some("29ABCDE1234F1Z5"),
                order_number: some("123-4567890-1234567"),
                invoice_number: some("IN-001"),
                sold_by: some("ABC Corp 123 Street City"),
                shipping_address: some("Jane 789 Rd"),
                billing_address: some("John Doe 456 Ave"),
            }
        );
    }

    #[test]
    fn test_single_value_fields() {
        let text = "GST Registration No : 29ABCDE1234F1Z5\nOrder Number : 405-1234567-8901234\n";
        let details = extract(text).unwrap();

        assert_eq!(details.gst_no, some("29ABCDE1234F1Z5"));
        assert_eq!(details.order_number, some("405-1234567-8901234"));
        assert_eq!(details.found_count(), 2);
    }

    #[test]
    fn test_address_blocks_join_lines() {
        let text = "Sold By:\nAcme Traders\n123 Market St\nBilling Address:\nJohn Doe\nPAN No: ABCDE1234F\n";
        let details = extract(text).unwrap();

        assert_eq!(details.sold_by, some("Acme Traders 123 Market St"));
        assert_eq!(details.billing_address, some("John Doe"));
        assert_eq!(details.shipping_address, None);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let details = extract("invoice number: XYZ-9\norder number : 111-222").unwrap();

        assert_eq!(details.invoice_number, some("XYZ-9"));
        assert_eq!(details.order_number, some("111-222"));
        assert_eq!(details.gst_no, None);
        assert_eq!(details.sold_by, None);
        assert_eq!(details.shipping_address, None);
        assert_eq!(details.billing_address, None);
    }

    #[test]
    fn test_empty_text_is_unextractable() {
        assert_eq!(extract(""), Err(ExtractionError::UnextractableText));
        assert_eq!(extract("  \n\t "), Err(ExtractionError::UnextractableText));
    }

    #[test]
    fn test_text_without_labels_is_all_absent() {
        let details = extract("Thank you for shopping with us").unwrap();
        assert!(details.is_empty());
    }

    #[test]
    fn test_missing_closing_label_only_drops_that_field() {
        let text = FULL_INVOICE.replace("State/UT Code", "Region");
        let details = extract(&text).unwrap();

        assert_eq!(details.shipping_address, None);
        assert_eq!(details.sold_by, some("ABC Corp 123 Street City"));
        assert_eq!(details.billing_address, some("John Doe 456 Ave"));
        assert_eq!(details.invoice_number, some("IN-001"));
    }

    #[test]
    fn test_each_field_independent_of_others() {
        for field in InvoiceField::ALL {
            let text = FULL_INVOICE.replace(field.label(), "Redacted");
            let details = extract(&text).unwrap();
            let full = extract(FULL_INVOICE).unwrap();

            assert_eq!(details.get(field), None, "{}", field);
            for other in InvoiceField::ALL {
                // Removing an opening label can also remove another block's closing label.
                let closes = matches!(
                    (field, other),
                    (InvoiceField::BillingAddress, InvoiceField::SoldBy)
                );
                if other != field && !closes {
                    assert_eq!(details.get(other), full.get(other), "{} after removing {}", other, field);
                }
            }
        }
    }

    #[test]
    fn test_whitespace_only_block_is_absent() {
        let details = extract("Sold By :   \n  \nBilling Address : x PAN No: y").unwrap();
        assert_eq!(details.sold_by, None);
        assert_eq!(details.billing_address, some("x"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let details = extract("Invoice Number: A-1\nInvoice Number: B-2").unwrap();
        assert_eq!(details.invoice_number, some("A-1"));
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(extract(FULL_INVOICE), extract(FULL_INVOICE));
    }

    #[test]
    fn test_values_never_blank() {
        let details = extract(FULL_INVOICE).unwrap();
        for (_, value) in details.iter() {
            if let Some(value) = value {
                assert_eq!(value, value.trim());
                assert!(!value.is_empty());
            }
        }
    }
}
