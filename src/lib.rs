//! # Slipline - Serial Receipt Printer Connectivity
//!
//! Slipline drives ESC/POS thermal receipt printers attached over a serial
//! line. It provides:
//!
//! - **Connection management**: a single printer session that reconnects
//!   without prompting, falls back across ports, and remembers the last
//!   working connection for a day
//! - **Protocol implementation**: ESC/POS text, style and cut commands
//! - **Templates**: assignment slips, bag labels and order records
//! - **Transport**: OS serial ports, plus an in-memory simulator
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use slipline::{
//!     connection::{ConnectionManager, ManagerOptions},
//!     store::FileStore,
//!     templates::BagLabel,
//!     transport::SerialTransport,
//! };
//!
//! # async fn example() -> Result<(), slipline::SliplineError> {
//! let manager = ConnectionManager::new(
//!     Arc::new(SerialTransport::new(Some("grants.json".into()))),
//!     Arc::new(FileStore::new("connection.json")),
//!     ManagerOptions::default(),
//! );
//!
//! // Reopen yesterday's printer without asking the user
//! let status = manager.quick_reconnect().await;
//! if status.connected {
//!     manager
//!         .print_bag_label(&BagLabel {
//!             order_number: "1042".into(),
//!             customer: "Ada".into(),
//!             bag_number: 1,
//!             bag_count: 2,
//!             service: None,
//!             date: None,
//!         })
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | Session state machine and printing |
//! | [`store`] | Persisted last-known-good connection |
//! | [`transport`] | Serial backends |
//! | [`protocol`] | ESC/POS command builders and encoder |
//! | [`document`] | Print document model |
//! | [`templates`] | Business document templates |
//! | [`printer`] | Printer family constants and paper profiles |
//! | [`config`] | Runtime settings |
//! | [`server`] | HTTP API for a host UI |
//! | [`error`] | Error types |

pub mod config;
pub mod connection;
pub mod document;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod server;
pub mod store;
pub mod templates;
pub mod transport;

// Re-exports for convenience
pub use connection::{ConnectionManager, ConnectionStatus};
pub use error::SliplineError;
pub use printer::PrinterProfile;
pub use transport::SerialTransport;
