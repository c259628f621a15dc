//! Values returned across the manager's public boundary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SliplineError;
use crate::store::{ConnectionIdentity, ConnectionRecord};

/// Outcome of a connection operation.
///
/// Serializes as `{"connected": false, "error": "AuthorizationDenied"}`;
/// `error` is omitted on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn connected() -> Self {
        Self {
            connected: true,
            error: None,
        }
    }

    pub fn failed(error: &SliplineError) -> Self {
        Self {
            connected: false,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<(), SliplineError>> for ConnectionStatus {
    fn from(result: Result<(), SliplineError>) -> Self {
        match result {
            Ok(()) => Self::connected(),
            Err(e) => Self::failed(&e),
        }
    }
}

/// Summary of a usable persisted connection, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentConnectionInfo {
    pub port_name: String,
    pub connected_at: DateTime<Utc>,
}

impl From<&ConnectionRecord> for PersistentConnectionInfo {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            port_name: port_label(&record.identity, record.saved_index),
            connected_at: record.timestamp,
        }
    }
}

fn port_label(identity: &ConnectionIdentity, index: usize) -> String {
    match (identity.vendor_id, identity.product_id) {
        (Some(vid), Some(pid)) => format!("USB {:04x}:{:04x} (port {})", vid, pid, index),
        _ => format!("Serial port {}", index),
    }
}

/// One baud rate tried by [`negotiate_baud`](super::ConnectionManager::negotiate_baud).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaudAttempt {
    pub baud: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a baud negotiation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NegotiationReport {
    /// The baud that completed a write, if any
    pub baud: Option<u32>,
    pub attempts: Vec<BaudAttempt>,
}

/// Per-job result of a batch print, delivered in job order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub index: usize,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
