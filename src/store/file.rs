//! JSON file backed connection store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ConnectionRecord, ConnectionStore};
use crate::error::SliplineError;

/// Stores the record as one JSON file.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so
/// a crash mid-write leaves either the old record or the new one.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConnectionStore for FileStore {
    fn load(&self) -> Option<ConnectionRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read connection record");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt connection record");
                None
            }
        }
    }

    fn save(&self, record: &ConnectionRecord) -> Result<(), SliplineError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                SliplineError::Persistence(format!(
                    "Failed to write {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        debug!(path = %self.path.display(), index = record.saved_index, "Connection record saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SliplineError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SliplineError::Persistence(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
