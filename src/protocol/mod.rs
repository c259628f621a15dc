//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS dialect spoken by serial
//! thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Initialization and paper cutting
//! - [`text`]: Alignment and the combined print-mode byte
//! - [`encoder`]: Line-oriented builder used by documents
//!
//! ## Usage Example
//!
//! ```
//! use slipline::protocol::{Encoder, TextOptions};
//!
//! let mut enc = Encoder::new();
//! enc.reset();
//! enc.text("ORDER 42", TextOptions::new().center().bold().double_height());
//! enc.separator('-', 32);
//! enc.text("", TextOptions::new());
//! enc.text("", TextOptions::new());
//! enc.cut();
//!
//! // Send `enc.finish()` to the printer via a connection...
//! ```

pub mod commands;
pub mod encoder;
pub mod text;

pub use encoder::{Encoder, TextOptions};
pub use text::{Alignment, TextStyle};
