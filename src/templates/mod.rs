//! # Document Templates
//!
//! Builders that turn business fields into [`PrintDocument`]s.
//!
//! | Name | Fields | Output |
//! |------|--------|--------|
//! | `assignment-slip` | [`AssignmentSlip`] | Work slip handed to whoever processes an order |
//! | `bag-label` | [`BagLabel`] | Large order number label for one bag of an order |
//! | `order-record` | [`OrderRecord`] | Itemized record with totals |
//!
//! Every template emits a fixed sequence of lines for a given variant.
//! Optional fields print as [`EMPTY_VALUE`] instead of being skipped, so
//! two documents of the same variant always have the same structure.
//!
//! Fields arrive as camelCase JSON from the HTTP API and the CLI:
//!
//! ```
//! use slipline::templates::{render_json, TemplateKind};
//! use slipline::printer::PrinterProfile;
//!
//! let fields = serde_json::json!({
//!     "orderNumber": "1042",
//!     "customer": "Ada",
//!     "bagNumber": 1,
//!     "bagCount": 2,
//! });
//! let doc = render_json(TemplateKind::BagLabel, fields, &PrinterProfile::default()).unwrap();
//! assert!(doc.is_finished());
//! ```

mod assignment;
mod bag_label;
mod order_record;

pub use assignment::{AssignmentSlip, SlipVariant};
pub use bag_label::BagLabel;
pub use order_record::{LineItem, OrderRecord};

use serde::de::DeserializeOwned;
use std::fmt;

use crate::document::PrintDocument;
use crate::error::SliplineError;
use crate::printer::PrinterProfile;

/// Printed in place of a missing optional value.
pub const EMPTY_VALUE: &str = "-";

/// The supported templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    AssignmentSlip,
    BagLabel,
    OrderRecord,
}

impl TemplateKind {
    /// Every template, in listing order.
    pub const ALL: [TemplateKind; 3] = [Self::AssignmentSlip, Self::BagLabel, Self::OrderRecord];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AssignmentSlip => "assignment-slip",
            Self::BagLabel => "bag-label",
            Self::OrderRecord => "order-record",
        }
    }

    /// Look up a template by name. Underscores and case are tolerated.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "assignment-slip" | "assignment" => Some(Self::AssignmentSlip),
            "bag-label" | "bag" => Some(Self::BagLabel),
            "order-record" | "order" | "record" => Some(Self::OrderRecord),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of every template.
pub fn list_templates() -> Vec<&'static str> {
    TemplateKind::ALL.iter().map(|k| k.name()).collect()
}

/// Deserialize `fields` for `kind` and render the document.
pub fn render_json(
    kind: TemplateKind,
    fields: serde_json::Value,
    profile: &PrinterProfile,
) -> Result<PrintDocument, SliplineError> {
    match kind {
        TemplateKind::AssignmentSlip => Ok(parse::<AssignmentSlip>(kind, fields)?.render(profile)),
        TemplateKind::BagLabel => parse::<BagLabel>(kind, fields)?.render(profile),
        TemplateKind::OrderRecord => parse::<OrderRecord>(kind, fields)?.render(profile),
    }
}

fn parse<T: DeserializeOwned>(kind: TemplateKind, fields: serde_json::Value) -> Result<T, SliplineError> {
    serde_json::from_value(fields)
        .map_err(|e| SliplineError::InvalidDocument(format!("{}: {}", kind, e)))
}

/// `value` or [`EMPTY_VALUE`].
pub(crate) fn or_empty(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => EMPTY_VALUE,
    }
}

/// Left text and right-aligned amount on one line of `width` columns.
///
/// The left text is truncated so at least one space separates the two.
pub(crate) fn two_column(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let left_max = width.saturating_sub(right_len + 1);
    let left: String = left.chars().take(left_max).collect();
    let padding = width.saturating_sub(left.chars().count() + right_len).max(1);
    format!("{}{}{}", left, " ".repeat(padding), right)
}

/// Cents as `12.50`.
pub(crate) fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_templates() {
        assert_eq!(
            list_templates(),
            vec!["assignment-slip", "bag-label", "order-record"]
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            TemplateKind::from_name("assignment-slip"),
            Some(TemplateKind::AssignmentSlip)
        );
        assert_eq!(TemplateKind::from_name("BAG_LABEL"), Some(TemplateKind::BagLabel));
        assert_eq!(TemplateKind::from_name("order"), Some(TemplateKind::OrderRecord));
        assert_eq!(TemplateKind::from_name("ripple"), None);
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_two_column() {
        assert_eq!(two_column("Shirt", "4.50", 12), "Shirt   4.50");
        assert_eq!(two_column("A very long name", "4.50", 12), "A very  4.50");
        assert_eq!(two_column("Shirt", "4.50", 12).chars().count(), 12);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-305), "-3.05");
    }

    #[test]
    fn test_or_empty() {
        assert_eq!(or_empty(&None), "-");
        assert_eq!(or_empty(&Some("  ".into())), "-");
        assert_eq!(or_empty(&Some("Cold".into())), "Cold");
    }

    #[test]
    fn test_render_json_rejects_bad_fields() {
        let err = render_json(
            TemplateKind::OrderRecord,
            serde_json::json!({ "customer": 5 }),
            &PrinterProfile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SliplineError::InvalidDocument(_)));
        assert!(err.to_string().contains("order-record"));
    }

    #[test]
    fn test_render_json_rejects_overflowing_amount() {
        let err = render_json(
            TemplateKind::OrderRecord,
            serde_json::json!({
                "orderNumber": "1",
                "customer": "Ada",
                "items": [{ "description": "Rug", "quantity": 4000000000u32, "unitPriceCents": 9000000000000i64 }],
            }),
            &PrinterProfile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SliplineError::InvalidDocument(_)));
    }
}
