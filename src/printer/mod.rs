//! # Printer Module
//!
//! This module provides printer-specific configurations.
//!
//! ## Modules
//!
//! - [`config`]: Paper widths and serial defaults

pub mod config;

pub use config::{BAUD_CANDIDATES, DEFAULT_BAUD, PrinterProfile};
