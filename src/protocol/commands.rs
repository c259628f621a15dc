//! # ESC/POS Protocol Commands
//!
//! This module implements the basic ESC/POS commands understood by generic
//! serial thermal receipt printers (58mm and 80mm families).
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC a n`, `ESC ! n`, `GS V m`
//!
//! The firmware is a byte-stream state machine: a mode set by one command
//! stays active until another command changes it or `ESC @` resets it.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for paper cutting, character size and status commands.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and restores the power-on mode settings.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## What Gets Reset
///
/// - Print mode (bold, double height, double width)
/// - Justification back to left
/// - Line spacing
///
/// ## Example
///
/// ```
/// use slipline::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Full Cut (GS V 0)
///
/// Cuts the paper at the current position.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
/// | Decimal | 29 86 0  |
///
/// ## Behavior
///
/// The cutter sits a few lines above the print head, so documents feed
/// blank lines before cutting to keep the last printed line on the slip.
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_cut_full() {
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
    }
}
