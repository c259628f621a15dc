//! In-memory connection store.

use std::sync::Mutex;

use super::{ConnectionRecord, ConnectionStore};
use crate::error::SliplineError;

/// Keeps the record for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<ConnectionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `record` already stored.
    pub fn with_record(record: ConnectionRecord) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }
}

impl ConnectionStore for MemoryStore {
    fn load(&self) -> Option<ConnectionRecord> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, record: &ConnectionRecord) -> Result<(), SliplineError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SliplineError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
