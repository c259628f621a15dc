//! # Golden Tests
//!
//! These tests pin the exact bytes each template produces, so any change to
//! the encoder or a template layout shows up as a byte diff.
//!
//! Expected streams are written out with small helpers that mirror the
//! printer's command grammar: an optional `ESC a n`, `ESC ! n`, the text,
//! `ESC ! 0` when styled, then `LF`.

use pretty_assertions::assert_eq;
use slipline::document::{Directive, PrintDocument};
use slipline::printer::PrinterProfile;
use slipline::protocol::{Encoder, TextOptions};
use slipline::templates::{self, AssignmentSlip, BagLabel, LineItem, OrderRecord, TemplateKind};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const LEFT: Option<u8> = Some(0);
const CENTER: Option<u8> = Some(1);

const BOLD: u8 = 0x08;
const TALL: u8 = 0x10;
const WIDE: u8 = 0x20;

/// Expected bytes for one `text` line.
fn line(align: Option<u8>, mode: u8, content: &str) -> Vec<u8> {
    let mut out = Vec::new();
    if let Some(n) = align {
        out.extend([0x1B, b'a', n]);
    }
    out.extend([0x1B, b'!', mode]);
    out.extend(content.as_bytes());
    if mode != 0 {
        out.extend([0x1B, b'!', 0]);
    }
    out.push(0x0A);
    out
}

fn init() -> Vec<u8> {
    vec![0x1B, 0x40]
}

/// Two blank lines and a full cut.
fn tail() -> Vec<u8> {
    let mut out = line(None, 0, "");
    out.extend(line(None, 0, ""));
    out.extend([0x1D, b'V', 0]);
    out
}

fn bag_label() -> BagLabel {
    BagLabel {
        order_number: "1042".into(),
        customer: "Ada".into(),
        bag_number: 1,
        bag_count: 2,
        service: None,
        date: Some("2026-10-19".into()),
    }
}

fn assignment_slip() -> AssignmentSlip {
    AssignmentSlip {
        order_number: "1042".into(),
        customer: "Ada".into(),
        assigned_to: "Sam".into(),
        service: "Wash".into(),
        quantity: 12,
        remaining: None,
        wash: Some("Cold".into()),
        process: None,
        due: Some("Fri".into()),
        notes: None,
    }
}

fn order_record() -> OrderRecord {
    OrderRecord {
        order_number: "88".into(),
        customer: "Grace".into(),
        phone: None,
        date: Some("2026-10-19".into()),
        items: vec![LineItem {
            description: "Shirt".into(),
            quantity: 3,
            unit_price_cents: 250,
        }],
        notes: None,
    }
}

/// Directive kinds only, ignoring content.
fn shape(doc: &PrintDocument) -> Vec<String> {
    doc.directives()
        .iter()
        .map(|d| match d {
            Directive::Reset => "reset".to_string(),
            Directive::Text { options, .. } => format!("text{:?}", options),
            Directive::Separator { ch, length } => format!("sep{}{}", ch, length),
            Directive::Cut => "cut".to_string(),
        })
        .collect()
}

// ============================================================================
// ENCODER
// ============================================================================

#[test]
fn test_binary_styled_line_resets_immediately() {
    let mut enc = Encoder::new();
    enc.text("HI", TextOptions::new().center().bold().double_width())
        .text("next", TextOptions::new());

    let mut expected = line(CENTER, BOLD | WIDE, "HI");
    expected.extend(line(None, 0, "next"));
    assert_eq!(enc.finish(), expected);
}

#[test]
fn test_binary_encoder_is_deterministic() {
    let build = || {
        let mut enc = Encoder::new();
        enc.reset()
            .text("A", TextOptions::new().right().double_height())
            .separator('=', 4)
            .cut();
        enc.finish()
    };
    assert_eq!(build(), build());
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[test]
fn test_binary_bag_label_58mm() {
    let doc = bag_label().render(&PrinterProfile::PAPER_58MM).unwrap();

    let mut expected = init();
    expected.extend(line(CENTER, BOLD | TALL | WIDE, "#1042"));
    expected.extend(line(CENTER, BOLD, "Ada"));
    expected.extend(line(CENTER, TALL, "Bag 1 of 2"));
    expected.extend(line(None, 0, &"-".repeat(32)));
    expected.extend(line(LEFT, 0, "Service:      -"));
    expected.extend(line(LEFT, 0, "Date:         2026-10-19"));
    expected.extend(tail());

    assert_eq!(doc.to_bytes(), expected);
}

#[test]
fn test_binary_assignment_slip_full() {
    let doc = assignment_slip().render(&PrinterProfile::PAPER_58MM);

    let mut expected = init();
    expected.extend(line(CENTER, BOLD | TALL | WIDE, "ASSIGNMENT"));
    expected.extend(line(CENTER, BOLD, "Order #1042"));
    expected.extend(line(None, 0, &"=".repeat(32)));
    expected.extend(line(LEFT, 0, "Customer:     Ada"));
    expected.extend(line(LEFT, 0, "Assigned to:  Sam"));
    expected.extend(line(LEFT, 0, "Service:      Wash"));
    expected.extend(line(LEFT, 0, "Quantity:     12"));
    expected.extend(line(LEFT, 0, "Wash:         Cold"));
    expected.extend(line(LEFT, 0, "Process:      -"));
    expected.extend(line(LEFT, 0, "Due:          Fri"));
    expected.extend(line(None, 0, &"-".repeat(32)));
    expected.extend(line(LEFT, 0, "Notes:        -"));
    expected.extend(tail());

    assert_eq!(doc.to_bytes(), expected);
}

#[test]
fn test_binary_assignment_slip_remaining() {
    let mut slip = assignment_slip();
    slip.remaining = Some(5);
    let doc = slip.render(&PrinterProfile::PAPER_58MM);

    let mut expected = init();
    expected.extend(line(CENTER, BOLD | TALL | WIDE, "ASSIGNMENT"));
    expected.extend(line(CENTER, BOLD, "Order #1042"));
    expected.extend(line(None, 0, &"=".repeat(32)));
    expected.extend(line(LEFT, 0, "Customer:     Ada"));
    expected.extend(line(LEFT, 0, "Assigned to:  Sam"));
    expected.extend(line(LEFT, 0, "Service:      Wash"));
    expected.extend(line(LEFT, BOLD, "Remaining:    5 of 12"));
    expected.extend(line(LEFT, 0, "Due:          Fri"));
    expected.extend(line(None, 0, &"-".repeat(32)));
    expected.extend(line(LEFT, 0, "Notes:        -"));
    expected.extend(tail());

    assert_eq!(doc.to_bytes(), expected);
}

#[test]
fn test_binary_order_record_58mm() {
    let doc = order_record().render(&PrinterProfile::PAPER_58MM).unwrap();

    let mut expected = init();
    expected.extend(line(CENTER, BOLD | TALL, "ORDER RECORD"));
    expected.extend(line(CENTER, 0, "Order #88"));
    expected.extend(line(None, 0, &"=".repeat(32)));
    expected.extend(line(LEFT, 0, "Customer:     Grace"));
    expected.extend(line(LEFT, 0, "Phone:        -"));
    expected.extend(line(LEFT, 0, "Date:         2026-10-19"));
    expected.extend(line(None, 0, &"-".repeat(32)));
    expected.extend(line(LEFT, BOLD, &format!("ITEM{}AMOUNT", " ".repeat(22))));
    expected.extend(line(LEFT, 0, &format!("Shirt x3{}7.50", " ".repeat(20))));
    expected.extend(line(None, 0, &"-".repeat(32)));
    expected.extend(line(LEFT, BOLD, &format!("TOTAL{}7.50", " ".repeat(23))));
    expected.extend(line(LEFT, 0, "Notes:        -"));
    expected.extend(tail());

    assert_eq!(doc.to_bytes(), expected);
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_same_variant_same_structure() {
    let mut other = assignment_slip();
    other.customer = "Someone With A Long Name".into();
    other.wash = None;
    other.due = None;
    other.notes = Some("Rush".into());

    let profile = PrinterProfile::default();
    assert_eq!(
        shape(&assignment_slip().render(&profile)),
        shape(&other.render(&profile))
    );
}

#[test]
fn test_every_template_starts_with_reset_and_ends_with_cut() {
    let profile = PrinterProfile::default();
    let docs = [
        assignment_slip().render(&profile),
        bag_label().render(&profile).unwrap(),
        order_record().render(&profile).unwrap(),
    ];
    for doc in &docs {
        let bytes = doc.to_bytes();
        assert_eq!(&bytes[..2], &[0x1B, 0x40], "{}", doc.template());
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x00], "{}", doc.template());
    }
}

#[test]
fn test_render_json_matches_typed_render() {
    let fields = serde_json::json!({
        "orderNumber": "1042",
        "customer": "Ada",
        "bagNumber": 1,
        "bagCount": 2,
        "date": "2026-10-19",
    });
    let from_json =
        templates::render_json(TemplateKind::BagLabel, fields, &PrinterProfile::PAPER_58MM)
            .unwrap();
    let typed = bag_label().render(&PrinterProfile::PAPER_58MM).unwrap();
    assert_eq!(from_json, typed);
}
