//! # Connection Persistence
//!
//! A single-slot store for the last connection that worked, so a later
//! process can try to reconnect without asking the user again.
//!
//! ## Record Format
//!
//! ```json
//! {
//!   "connected": true,
//!   "identity": { "vendorId": 1046, "productId": 20497 },
//!   "savedIndex": 0,
//!   "timestamp": 1760000000000
//! }
//! ```
//!
//! `timestamp` is in epoch milliseconds. A record older than
//! [`STALE_AFTER`] is ignored.
//!
//! ## Failure Policy
//!
//! `load` never fails: a missing, unreadable, or corrupt record is simply
//! absent. Only `save` and `clear` report errors.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SliplineError;
use crate::transport::PortInfo;

/// Age at which a record stops being used for reconnection.
pub const STALE_AFTER: TimeDelta = TimeDelta::hours(24);

/// Coarse device identity. Only a hint; enumeration order and ids can both
/// change between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionIdentity {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl From<&PortInfo> for ConnectionIdentity {
    fn from(info: &PortInfo) -> Self {
        Self {
            vendor_id: info.vendor_id,
            product_id: info.product_id,
        }
    }
}

/// The persisted last-known-good connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub connected: bool,
    pub identity: ConnectionIdentity,
    /// Index into the enumeration taken when the record was written
    pub saved_index: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ConnectionRecord {
    /// A `connected` record stamped `now`.
    pub fn connected(identity: ConnectionIdentity, saved_index: usize, now: DateTime<Utc>) -> Self {
        Self {
            connected: true,
            identity,
            saved_index,
            timestamp: now,
        }
    }
}

/// `true` while `record` is younger than [`STALE_AFTER`].
pub fn is_fresh(record: &ConnectionRecord, now: DateTime<Utc>) -> bool {
    now - record.timestamp < STALE_AFTER
}

/// Single-slot, overwrite-only record storage.
pub trait ConnectionStore: Send + Sync {
    /// The stored record, or `None` if absent or unreadable.
    fn load(&self) -> Option<ConnectionRecord>;

    /// Replace the stored record.
    fn save(&self, record: &ConnectionRecord) -> Result<(), SliplineError>;

    /// Remove the stored record. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SliplineError>;
}

// ============================================================================
// TESTS
// ============================================================================
