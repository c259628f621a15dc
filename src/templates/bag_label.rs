//! Bag label: the order number, large, for tagging one bag of an order.

use serde::Deserialize;

use super::or_empty;
use crate::document::PrintDocument;
use crate::error::SliplineError;
use crate::printer::PrinterProfile;
use crate::protocol::TextOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagLabel {
    pub order_number: String,
    pub customer: String,
    /// 1-based
    pub bag_number: u32,
    pub bag_count: u32,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl BagLabel {
    /// Fails when `bag_number` is not within `1..=bag_count`.
    pub fn render(&self, profile: &PrinterProfile) -> Result<PrintDocument, SliplineError> {
        if self.bag_number == 0 || self.bag_number > self.bag_count {
            return Err(SliplineError::InvalidDocument(format!(
                "bag {} of {} is out of range",
                self.bag_number, self.bag_count
            )));
        }

        let mut doc = PrintDocument::new("bag-label");
        doc.text(
            format!("#{}", self.order_number),
            TextOptions::new().center().bold().double_height().double_width(),
        )
        .text(&self.customer, TextOptions::new().center().bold())
        .text(
            format!("Bag {} of {}", self.bag_number, self.bag_count),
            TextOptions::new().center().double_height(),
        )
        .separator('-', profile.columns)
        .field("Service:", or_empty(&self.service))
        .field("Date:", or_empty(&self.date))
        .finish();
        Ok(doc)
    }
}
