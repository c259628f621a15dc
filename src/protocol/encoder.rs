//! # Command Encoder
//!
//! Turns text lines and control directives into the exact byte stream the
//! printer firmware expects.
//!
//! Every [`Encoder::text`] call is self-contained: it sets its own
//! alignment and print mode, writes the content, clears the print mode if it
//! changed it, and ends the line. No style state leaks into the next line.

use serde::{Deserialize, Serialize};

use super::commands::{self, LF};
use super::text::{self, Alignment, TextStyle};

/// Per-line formatting for [`Encoder::text`].
///
/// ## Example
///
/// ```
/// use slipline::protocol::TextOptions;
///
/// let heading = TextOptions::new().center().bold().double_height();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOptions {
    /// `None` leaves the current justification untouched.
    pub align: Option<Alignment>,
    #[serde(flatten)]
    pub style: TextStyle,
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(mut self) -> Self {
        self.align = Some(Alignment::Left);
        self
    }

    pub fn center(mut self) -> Self {
        self.align = Some(Alignment::Center);
        self
    }

    pub fn right(mut self) -> Self {
        self.align = Some(Alignment::Right);
        self
    }

    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    pub fn double_height(mut self) -> Self {
        self.style.double_height = true;
        self
    }

    pub fn double_width(mut self) -> Self {
        self.style.double_width = true;
        self
    }
}

/// Builder for ESC/POS byte buffers.
///
/// ```
/// use slipline::protocol::{Encoder, TextOptions};
///
/// let mut enc = Encoder::new();
/// enc.reset()
///     .text("RECEIPT", TextOptions::new().center().bold())
///     .separator('-', 32)
///     .text("", TextOptions::new())
///     .text("", TextOptions::new())
///     .cut();
/// let bytes = enc.finish();
/// assert_eq!(&bytes[..2], &[0x1B, 0x40]);
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(512),
        }
    }

    /// ESC @, opens every document.
    pub fn reset(&mut self) -> &mut Self {
        self.buffer.extend(commands::init());
        self
    }

    /// Emit one line: alignment, print mode, content, mode reset, LF.
    pub fn text(&mut self, content: &str, options: TextOptions) -> &mut Self {
        if let Some(alignment) = options.align {
            self.buffer.extend(text::align(alignment));
        }
        self.buffer.extend(text::print_mode(options.style.mode_byte()));
        self.buffer.extend_from_slice(content.as_bytes());
        if !options.style.is_plain() {
            self.buffer.extend(text::reset_style());
        }
        self.buffer.push(LF);
        self
    }

    /// A plain line made of `ch` repeated `length` times.
    pub fn separator(&mut self, ch: char, length: usize) -> &mut Self {
        let line: String = std::iter::repeat_n(ch, length).collect();
        self.text(&line, TextOptions::new())
    }

    /// GS V 0, full cut.
    pub fn cut(&mut self) -> &mut Self {
        self.buffer.extend(commands::cut_full());
        self
    }

    /// Bytes emitted so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

// ============================================================================
// TESTS
// ============================================================================
