//! Label patterns for invoice field extraction.
//!
//! Labels match case-insensitively. Single-value fields capture one token
//! after the colon; block fields capture everything up to the next expected
//! label, across line breaks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Single-value fields
    pub static ref GST_NO: Regex = Regex::new(
        r"(?i)GST Registration No\s*:\s*(\S+)"
    ).unwrap();

    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"(?i)Order Number\s*:\s*([0-9\-]+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)Invoice Number\s*:\s*(\S+)"
    ).unwrap();

    // Address blocks, closed by the label that follows them on the invoice
    pub static ref SOLD_BY: Regex = Regex::new(
        r"(?is)Sold By\s*:\s*(.*?)\s*Billing Address\s*:"
    ).unwrap();

    pub static ref SHIPPING_ADDRESS: Regex = Regex::new(
        r"(?is)Shipping Address\s*:\s*(.*?)\s*State/UT Code\s*:"
    ).unwrap();

    pub static ref BILLING_ADDRESS: Regex = Regex::new(
        r"(?is)Billing Address\s*:\s*(.*?)\s*PAN No\s*:"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_case_insensitive() {
        assert!(GST_NO.is_match("gst registration no: 29AAA"));
        assert!(INVOICE_NUMBER.is_match("INVOICE NUMBER:IN-1"));
        assert!(SOLD_BY.is_match("sold by:\nAcme\nbilling address:"));
    }

    #[test]
    fn test_order_number_stops_at_non_digit() {
        let caps = ORDER_NUMBER.captures("Order Number: 405-12/A").unwrap();
        assert_eq!(&caps[1], "405-12");
    }

    #[test]
    fn test_block_spans_lines() {
        let caps = BILLING_ADDRESS
            .captures("Billing Address :\nJohn\nMumbai\nPAN No: X")
            .unwrap();
        assert_eq!(&caps[1], "John\nMumbai");
    }

    #[test]
    fn test_block_is_lazy() {
        let text = "Shipping Address: A\nState/UT Code: 1\nB\nState/UT Code: 2";
        let caps = SHIPPING_ADDRESS.captures(text).unwrap();
        assert_eq!(&caps[1], "A");
    }
}
