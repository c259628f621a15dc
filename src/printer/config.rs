//! # Printer Configuration
//!
//! Hardware characteristics of the supported serial printer family.
//!
//! ## Supported Paper Widths
//!
//! | Profile | Paper | Columns (Font A) |
//! |---------|-------|------------------|
//! | `PAPER_80MM` | 80mm | 48 |
//! | `PAPER_58MM` | 58mm | 32 |
//!
//! Every model in the family ships at 9600 baud.
//!
//! ## Usage
//!
//! ```
//! use slipline::printer::PrinterProfile;
//!
//! let profile = PrinterProfile::PAPER_80MM;
//! assert_eq!(profile.columns, 48);
//! ```

/// Baud rate the printer family ships with.
pub const DEFAULT_BAUD: u32 = 9600;

/// Baud rates tried by the diagnostic negotiation, most likely first.
pub const BAUD_CANDIDATES: [u32; 7] = [9600, 115200, 38400, 19200, 57600, 4800, 2400];

/// # Printer Profile
///
/// Defines the properties of a printer that matter to document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterProfile {
    /// Profile name
    pub name: &'static str,

    /// Characters per line in the default font
    pub columns: usize,
}

impl PrinterProfile {
    /// 80mm paper, 48 columns.
    pub const PAPER_80MM: Self = Self {
        name: "80mm",
        columns: 48,
    };

    /// 58mm paper, 32 columns.
    pub const PAPER_58MM: Self = Self {
        name: "58mm",
        columns: 32,
    };

    pub const ALL: [Self; 2] = [Self::PAPER_80MM, Self::PAPER_58MM];

    /// The profile printing exactly `columns` characters per line.
    pub fn for_columns(columns: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.columns == columns)
    }
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::PAPER_80MM
    }
}

// ============================================================================
// TESTS
// ============================================================================
