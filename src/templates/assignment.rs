//! Assignment slip: the work ticket for one order.

use serde::Deserialize;

use super::or_empty;
use crate::document::PrintDocument;
use crate::printer::PrinterProfile;
use crate::protocol::TextOptions;

/// Which layout an assignment slip uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlipVariant {
    /// Whole order, with wash and process instructions
    Full,
    /// Leftover quantity of a partly processed order; no wash/process lines
    Remaining,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSlip {
    pub order_number: String,
    pub customer: String,
    pub assigned_to: String,
    pub service: String,
    pub quantity: u32,
    /// Set when only part of the order is still to be processed
    #[serde(default)]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub wash: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AssignmentSlip {
    pub fn variant(&self) -> SlipVariant {
        if self.remaining.is_some() {
            SlipVariant::Remaining
        } else {
            SlipVariant::Full
        }
    }

    pub fn render(&self, profile: &PrinterProfile) -> PrintDocument {
        let variant = self.variant();
        let mut doc = PrintDocument::new("assignment-slip");

        doc.text(
            "ASSIGNMENT",
            TextOptions::new().center().bold().double_height().double_width(),
        )
        .text(
            format!("Order #{}", self.order_number),
            TextOptions::new().center().bold(),
        )
        .separator('=', profile.columns)
        .field("Customer:", &self.customer)
        .field("Assigned to:", &self.assigned_to)
        .field("Service:", &self.service);

        match variant {
            SlipVariant::Full => {
                doc.field("Quantity:", self.quantity.to_string())
                    .field("Wash:", or_empty(&self.wash))
                    .field("Process:", or_empty(&self.process));
            }
            SlipVariant::Remaining => {
                let remaining = self.remaining.unwrap_or(self.quantity);
                doc.bold_field(
                    "Remaining:",
                    format!("{} of {}", remaining, self.quantity),
                );
            }
        }

        doc.field("Due:", or_empty(&self.due))
            .separator('-', profile.columns)
            .field("Notes:", or_empty(&self.notes))
            .finish();
        doc
    }
}
