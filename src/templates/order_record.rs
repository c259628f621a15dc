//! Order record: an itemized copy of an order with its total.

use serde::Deserialize;

use super::{format_cents, or_empty, two_column};
use crate::document::PrintDocument;
use crate::error::SliplineError;
use crate::printer::PrinterProfile;
use crate::protocol::TextOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default = "one")]
    pub quantity: u32,
    pub unit_price_cents: i64,
}

fn one() -> u32 {
    1
}

impl LineItem {
    /// `None` when the amount does not fit in an `i64`.
    pub fn total_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: String,
    pub customer: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderRecord {
    /// Sum of every line, or `InvalidDocument` if any amount overflows.
    pub fn total_cents(&self) -> Result<i64, SliplineError> {
        self.items.iter().try_fold(0i64, |sum, item| {
            item.total_cents()
                .and_then(|line| sum.checked_add(line))
                .ok_or_else(|| amount_too_large(&item.description))
        })
    }

    pub fn render(&self, profile: &PrinterProfile) -> Result<PrintDocument, SliplineError> {
        let total = self.total_cents()?;
        let width = profile.columns;
        let mut doc = PrintDocument::new("order-record");

        doc.text("ORDER RECORD", TextOptions::new().center().bold().double_height())
            .text(format!("Order #{}", self.order_number), TextOptions::new().center())
            .separator('=', width)
            .field("Customer:", &self.customer)
            .field("Phone:", or_empty(&self.phone))
            .field("Date:", or_empty(&self.date))
            .separator('-', width)
            .text(two_column("ITEM", "AMOUNT", width), TextOptions::new().left().bold());

        for item in &self.items {
            let label = if item.quantity == 1 {
                item.description.clone()
            } else {
                format!("{} x{}", item.description, item.quantity)
            };
            doc.text(
                two_column(&label, &format_cents(item.total_cents().unwrap_or_default()), width),
                TextOptions::new().left(),
            );
        }

        doc.separator('-', width)
            .text(
                two_column("TOTAL", &format_cents(total), width),
                TextOptions::new().left().bold(),
            )
            .field("Notes:", or_empty(&self.notes))
            .finish();
        Ok(doc)
    }
}

fn amount_too_large(description: &str) -> SliplineError {
    SliplineError::InvalidDocument(format!("order-record: amount for '{}' is too large", description))
}
