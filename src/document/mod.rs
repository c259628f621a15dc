//! # Print Documents
//!
//! A [`PrintDocument`] is the abstract, inspectable form of one printed
//! slip: a template name plus an ordered list of [`Directive`]s. It sits
//! between the templates and the byte encoder:
//!
//! ```text
//! ┌───────────┐     ┌─────────────────┐     ┌──────────┐
//! │ Templates │ ──► │  PrintDocument  │ ──► │ Encoder  │ ──► bytes
//! │ (fields)  │     │ (Vec<Directive>)│     │ (ESC/POS)│
//! └───────────┘     └─────────────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use slipline::document::PrintDocument;
//! use slipline::protocol::TextOptions;
//!
//! let mut doc = PrintDocument::new("note");
//! doc.text("HELLO", TextOptions::new().center().bold());
//! doc.separator('-', 32);
//! doc.finish();
//!
//! // Inspect the directives
//! println!("{:#?}", doc);
//!
//! let bytes = doc.to_bytes();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod codegen;

use crate::protocol::TextOptions;

/// Width of the label column in `label: value` lines.
pub const LABEL_WIDTH: usize = 14;

/// Blank lines fed before the cut so the last line clears the cutter.
pub const TRAILING_BLANK_LINES: usize = 2;

/// One step of a document, encoded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Initialize the printer (ESC @).
    Reset,
    /// A styled line of text.
    Text { content: String, options: TextOptions },
    /// A plain line of a repeated character.
    Separator { ch: char, length: usize },
    /// Cut the paper.
    Cut,
}

/// An ordered print job. Always starts with [`Directive::Reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    template: String,
    directives: Vec<Directive>,
}

impl PrintDocument {
    /// Create a document holding only the initial reset.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            directives: vec![Directive::Reset],
        }
    }

    /// Name of the template that produced this document.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn text(&mut self, content: impl Into<String>, options: TextOptions) -> &mut Self {
        self.directives.push(Directive::Text {
            content: content.into(),
            options,
        });
        self
    }

    /// An empty plain line.
    pub fn blank(&mut self) -> &mut Self {
        self.text("", TextOptions::new())
    }

    pub fn separator(&mut self, ch: char, length: usize) -> &mut Self {
        self.directives.push(Directive::Separator { ch, length });
        self
    }

    /// A `label  value` line with the label padded to [`LABEL_WIDTH`].
    pub fn field(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        let line = pad_label(label, value.as_ref());
        self.text(line, TextOptions::new().left())
    }

    /// Same as [`field`](Self::field), in bold.
    pub fn bold_field(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        let line = pad_label(label, value.as_ref());
        self.text(line, TextOptions::new().left().bold())
    }

    /// Feed the trailing blank lines and cut.
    pub fn finish(&mut self) -> &mut Self {
        for _ in 0..TRAILING_BLANK_LINES {
            self.blank();
        }
        self.directives.push(Directive::Cut);
        self
    }

    /// True once the document ends with a cut.
    pub fn is_finished(&self) -> bool {
        matches!(self.directives.last(), Some(Directive::Cut))
    }
}

/// Pad `label` to [`LABEL_WIDTH`] columns and append `value`.
///
/// Labels longer than the column keep one separating space.
pub fn pad_label(label: &str, value: &str) -> String {
    let width = label.chars().count();
    if width >= LABEL_WIDTH {
        format!("{} {}", label, value)
    } else {
        format!("{}{}{}", label, " ".repeat(LABEL_WIDTH - width), value)
    }
}

// ============================================================================
// TESTS
// ============================================================================
