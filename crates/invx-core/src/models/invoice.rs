//! Invoice field data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the labeled invoice attributes the extractor recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    /// Seller GST registration number.
    GstNo,
    /// Marketplace order number.
    OrderNumber,
    /// Invoice number.
    InvoiceNumber,
    /// Seller name and address block.
    SoldBy,
    /// Shipping address block.
    ShippingAddress,
    /// Billing address block.
    BillingAddress,
}

impl InvoiceField {
    /// Every recognized field, in output order.
    pub const ALL: [InvoiceField; 6] = [
        InvoiceField::GstNo,
        InvoiceField::OrderNumber,
        InvoiceField::InvoiceNumber,
        InvoiceField::SoldBy,
        InvoiceField::ShippingAddress,
        InvoiceField::BillingAddress,
    ];

    /// The JSON key for this field.
    pub fn key(self) -> &'static str {
        match self {
            InvoiceField::GstNo => "gst_no",
            InvoiceField::OrderNumber => "order_number",
            InvoiceField::InvoiceNumber => "invoice_number",
            InvoiceField::SoldBy => "sold_by",
            InvoiceField::ShippingAddress => "shipping_address",
            InvoiceField::BillingAddress => "billing_address",
        }
    }

    /// Human-readable label, as printed on the invoice.
    pub fn label(self) -> &'static str {
        match self {
            InvoiceField::GstNo => "GST Registration No",
            InvoiceField::OrderNumber => "Order Number",
            InvoiceField::InvoiceNumber => "Invoice Number",
            InvoiceField::SoldBy => "Sold By",
            InvoiceField::ShippingAddress => "Shipping Address",
            InvoiceField::BillingAddress => "Billing Address",
        }
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for InvoiceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown invoice field: {}", s))
    }
}

/// Fields recovered from one invoice.
///
/// `None` marks a field whose label (or closing label) was not found. A
/// present value is a single line with surrounding whitespace trimmed and is
/// never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub gst_no: Option<String>,
    pub order_number: Option<String>,
    pub invoice_number: Option<String>,
    pub sold_by: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
}

impl InvoiceDetails {
    /// Value of a field, if it was found.
    pub fn get(&self, field: InvoiceField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set a field. Empty or whitespace-only values are stored as absent.
    pub fn set(&mut self, field: InvoiceField, value: Option<String>) {
        *self.slot_mut(field) = value.filter(|v| !v.trim().is_empty());
    }

    /// Iterate over all fields in output order.
    pub fn iter(&self) -> impl Iterator<Item = (InvoiceField, Option<&str>)> + '_ {
        InvoiceField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        self.iter().filter(|(_, value)| value.is_some()).count()
    }

    /// True if no field was found.
    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }

    fn slot(&self, field: InvoiceField) -> &Option<String> {
        match field {
            InvoiceField::GstNo => &self.gst_no,
            InvoiceField::OrderNumber => &self.order_number,
            InvoiceField::InvoiceNumber => &self.invoice_number,
            InvoiceField::SoldBy => &self.sold_by,
            InvoiceField::ShippingAddress => &self.shipping_address,
            InvoiceField::BillingAddress => &self.billing_address,
        }
    }

    fn slot_mut(&mut self, field: InvoiceField) -> &mut Option<String> {
        match field {
            InvoiceField::GstNo => &mut self.gst_no,
            InvoiceField::OrderNumber => &mut self.order_number,
            InvoiceField::InvoiceNumber => &mut self.invoice_number,
            InvoiceField::SoldBy => &mut self.sold_by,
            InvoiceField::ShippingAddress => &mut self.shipping_address,
            InvoiceField::BillingAddress => &mut self.billing_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serializes_all_keys_with_nulls() {
        let mut details = InvoiceDetails::default();
        details.set(InvoiceField::GstNo, Some("29ABCDE1234F1Z5".to_string()));

        let json = serde_json::to_value(&details).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 6);
        for field in InvoiceField::ALL {
            assert!(object.contains_key(field.key()), "missing {}", field);
        }
        assert_eq!(json["gst_no"], "29ABCDE1234F1Z5");
        assert!(json["billing_address"].is_null());
    }

    #[test]
    fn test_set_blank_is_absent() {
        let mut details = InvoiceDetails::default();
        details.set(InvoiceField::SoldBy, Some("   ".to_string()));
        assert_eq!(details.get(InvoiceField::SoldBy), None);
        assert!(details.is_empty());
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in InvoiceField::ALL {
            assert_eq!(field.key().parse::<InvoiceField>(), Ok(field));
        }
        assert!("total".parse::<InvoiceField>().is_err());
    }
}
