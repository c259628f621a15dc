//! # Settings
//!
//! Runtime configuration, loaded from an optional JSON file. Every field
//! has a default, so an empty object (or no file at all) is valid:
//!
//! ```json
//! {
//!   "storePath": "slipline-connection.json",
//!   "grantsPath": "slipline-grants.json",
//!   "defaultBaud": 9600,
//!   "baudCandidates": [9600, 115200, 38400, 19200, 57600, 4800, 2400],
//!   "interJobDelayMs": 5000,
//!   "writeChunkSize": 512,
//!   "portTimeoutMs": 1000,
//!   "columns": 48
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connection::ManagerOptions;
use crate::error::SliplineError;
use crate::printer::{BAUD_CANDIDATES, DEFAULT_BAUD, PrinterProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Where the last working connection is remembered
    pub store_path: PathBuf,
    /// Where granted serial port names are kept
    pub grants_path: PathBuf,
    pub default_baud: u32,
    pub baud_candidates: Vec<u32>,
    pub inter_job_delay_ms: u64,
    pub write_chunk_size: usize,
    pub port_timeout_ms: u64,
    /// Characters per line; 32 (58mm) or 48 (80mm)
    pub columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("slipline-connection.json"),
            grants_path: PathBuf::from("slipline-grants.json"),
            default_baud: DEFAULT_BAUD,
            baud_candidates: BAUD_CANDIDATES.to_vec(),
            inter_job_delay_ms: 5000,
            write_chunk_size: 512,
            port_timeout_ms: 1000,
            columns: PrinterProfile::PAPER_80MM.columns,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SliplineError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    /// Paper profile for `columns`. Widths no profile prints are rejected.
    pub fn profile(&self) -> Result<PrinterProfile, SliplineError> {
        PrinterProfile::for_columns(self.columns).ok_or_else(|| {
            let supported: Vec<String> = PrinterProfile::ALL
                .iter()
                .map(|p| format!("{} ({})", p.columns, p.name))
                .collect();
            SliplineError::Config(format!(
                "unsupported column count {}, expected one of: {}",
                self.columns,
                supported.join(", ")
            ))
        })
    }
}

impl TryFrom<&Settings> for ManagerOptions {
    type Error = SliplineError;

    fn try_from(settings: &Settings) -> Result<Self, Self::Error> {
        let baud_candidates = if settings.baud_candidates.is_empty() {
            BAUD_CANDIDATES.to_vec()
        } else {
            settings.baud_candidates.clone()
        };

        Ok(Self {
            default_baud: settings.default_baud,
            baud_candidates,
            inter_job_delay: Duration::from_millis(settings.inter_job_delay_ms),
            write_chunk_size: settings.write_chunk_size.max(1),
            profile: settings.profile()?,
        })
    }
}
