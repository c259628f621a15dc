//! Session state.

use serde::Serialize;

use crate::transport::{PortHandle, PortReader, PortWriter};

/// Where the session currently is.
///
/// ```text
///          quick_reconnect / connect
///   Idle ───────────────────────────► Open
///    ▲                                 │ write fails
///    │ disconnect / force_reset        ▼
///    └──────────────────────────── Degraded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No port held
    Idle,
    /// Port open with a live writer
    Open,
    /// Port open, writer unavailable
    Degraded,
}

/// The one open port a manager may hold.
pub(crate) struct Session {
    pub port: Option<PortHandle>,
    pub reader: Option<Box<dyn PortReader>>,
    pub writer: Option<Box<dyn PortWriter>>,
    pub baud: u32,
}

impl Session {
    pub fn new() -> Self {
        Self {
            port: None,
            reader: None,
            writer: None,
            baud: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match (&self.port, &self.writer) {
            (None, _) => ConnectionState::Idle,
            (Some(_), Some(_)) => ConnectionState::Open,
            (Some(_), None) => ConnectionState::Degraded,
        }
    }

    pub fn install(
        &mut self,
        port: PortHandle,
        reader: Option<Box<dyn PortReader>>,
        writer: Box<dyn PortWriter>,
        baud: u32,
    ) {
        self.port = Some(port);
        self.reader = reader;
        self.writer = Some(writer);
        self.baud = baud;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
