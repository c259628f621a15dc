//! Server state and configuration.

use std::sync::Arc;

use crate::connection::ConnectionManager;
use crate::printer::PrinterProfile;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState {
    pub manager: Arc<ConnectionManager>,
    /// Paper profile documents are laid out for
    pub profile: PrinterProfile,
}

impl AppState {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        let profile = manager.options().profile;
        Self { manager, profile }
    }
}
