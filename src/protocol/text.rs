//! # ESC/POS Text Styling Commands
//!
//! ## Text Styling Overview
//!
//! This printer family packs bold, double height and double width into a
//! single print-mode byte (`ESC ! n`), so a line's style is always set in
//! one command and cleared in one command:
//!
//! | Bit | Value | Effect |
//! |-----|-------|--------|
//! | 3 | 0x08 | Emphasized (bold) |
//! | 4 | 0x10 | Double height |
//! | 5 | 0x20 | Double width |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```

use serde::{Deserialize, Serialize};

use super::commands::ESC;

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// ## Parameters
///
/// - `n = 0`: Left alignment (default)
/// - `n = 1`: Center alignment
/// - `n = 2`: Right alignment
///
/// ## Example
///
/// ```
/// use slipline::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// PRINT MODE
// ============================================================================

/// Emphasized bit of the print-mode byte
pub const MODE_BOLD: u8 = 0x08;

/// Double-height bit of the print-mode byte
pub const MODE_DOUBLE_HEIGHT: u8 = 0x10;

/// Double-width bit of the print-mode byte
pub const MODE_DOUBLE_WIDTH: u8 = 0x20;

/// Style flags that share the print-mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub bold: bool,
    pub double_height: bool,
    pub double_width: bool,
}

impl TextStyle {
    /// Combine the flags into the device's print-mode byte.
    pub fn mode_byte(&self) -> u8 {
        let mut n = 0;
        if self.bold {
            n |= MODE_BOLD;
        }
        if self.double_height {
            n |= MODE_DOUBLE_HEIGHT;
        }
        if self.double_width {
            n |= MODE_DOUBLE_WIDTH;
        }
        n
    }

    /// True when no style flag is set.
    pub fn is_plain(&self) -> bool {
        self.mode_byte() == 0
    }
}

/// # Select Print Mode (ESC ! n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC ! n |
/// | Hex     | 1B 21 n |
/// | Decimal | 27 33 n |
///
/// ## Example
///
/// ```
/// use slipline::protocol::text::{print_mode, TextStyle};
///
/// let style = TextStyle { bold: true, double_height: true, double_width: false };
/// assert_eq!(print_mode(style.mode_byte()), vec![0x1B, 0x21, 0x18]);
/// ```
#[inline]
pub fn print_mode(n: u8) -> Vec<u8> {
    vec![ESC, b'!', n]
}

/// Clear every print-mode flag (ESC ! 0)
#[inline]
pub fn reset_style() -> Vec<u8> {
    print_mode(0)
}

// ============================================================================
// TESTS
// ============================================================================
