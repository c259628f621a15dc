//! # Simulated Transport
//!
//! A fully in-memory [`Transport`] for tests and offline demos. Each
//! simulated port has a scripted [`PortBehavior`], and every call is
//! recorded so tests can assert on ordering (which port was opened first,
//! whether the picker was shown, which bytes reached which port).
//!
//! ## Example
//!
//! ```
//! use slipline::transport::mock::{MockTransport, PortBehavior};
//! use slipline::transport::PortInfo;
//!
//! let transport = MockTransport::new()
//!     .with_granted_port(PortInfo::new("A"), PortBehavior::FailsOpen("busy".into()))
//!     .with_granted_port(PortInfo::new("B"), PortBehavior::Works);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    LineParams, OpenPort, PortChoice, PortHandle, PortInfo, PortPicker, PortReader, PortWriter,
    Transport,
};
use crate::error::SliplineError;

/// How a simulated port responds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortBehavior {
    /// Opens and accepts writes at any baud
    Works,
    /// `open` fails with this reason
    FailsOpen(String),
    /// Opens, but yields no writer
    NoWriter,
    /// Opens at any baud, but writes only succeed at this one
    WritesOnlyAt(u32),
}

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Enumerate,
    RequestNewPort,
    Open { port: String, baud: u32 },
    Close { port: String },
}

/// One successful `write_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub port: String,
    pub baud: u32,
    pub data: Vec<u8>,
}

struct SimPort {
    info: PortInfo,
    behavior: PortBehavior,
}

#[derive(Default)]
struct SimState {
    ports: Vec<SimPort>,
    granted: Vec<String>,
    open: HashMap<String, u32>,
    calls: Vec<TransportCall>,
    writes: Vec<WriteRecord>,
    input: VecDeque<u8>,
}

impl SimState {
    fn behavior(&self, name: &str) -> Option<PortBehavior> {
        self.ports
            .iter()
            .find(|p| p.info.name == name)
            .map(|p| p.behavior.clone())
    }

    fn handle(&self, name: &str) -> Option<PortHandle> {
        self.ports
            .iter()
            .find(|p| p.info.name == name)
            .map(|p| PortHandle::new(name, p.info.clone()))
    }
}

/// In-memory transport. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<SimState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a port the user already granted; it appears in `enumerate`.
    pub fn with_granted_port(self, info: PortInfo, behavior: PortBehavior) -> Self {
        {
            let mut state = self.lock();
            state.granted.push(info.name.clone());
            state.ports.push(SimPort { info, behavior });
        }
        self
    }

    /// Add a port that exists but is only reachable through the picker.
    pub fn with_pickable_port(self, info: PortInfo, behavior: PortBehavior) -> Self {
        self.lock().ports.push(SimPort { info, behavior });
        self
    }

    /// Change how a port behaves from now on.
    pub fn set_behavior(&self, name: &str, behavior: PortBehavior) {
        let mut state = self.lock();
        if let Some(port) = state.ports.iter_mut().find(|p| p.info.name == name) {
            port.behavior = behavior;
        }
    }

    /// Replace the enumeration order, as happens when devices are replugged.
    pub fn reorder_granted(&self, names: &[&str]) {
        self.lock().granted = names.iter().map(|n| n.to_string()).collect();
    }

    /// Queue bytes for the next reads.
    pub fn push_input(&self, data: &[u8]) {
        self.lock().input.extend(data);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    /// Names of ports passed to `open`, in call order.
    pub fn open_attempts(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Open { port, .. } => Some(port.clone()),
                _ => None,
            })
            .collect()
    }

    /// How often the picker was requested.
    pub fn picker_requests(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, TransportCall::RequestNewPort))
            .count()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    /// Everything written to `port`, concatenated.
    pub fn written_bytes(&self, port: &str) -> Vec<u8> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.port == port)
            .flat_map(|w| w.data.iter().copied())
            .collect()
    }

    /// Baud of `port` if currently open.
    pub fn open_baud(&self, port: &str) -> Option<u32> {
        self.lock().open.get(port).copied()
    }

    pub fn open_count(&self) -> usize {
        self.lock().open.len()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn enumerate(&self) -> Result<Vec<PortHandle>, SliplineError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Enumerate);
        Ok(state
            .granted
            .iter()
            .filter_map(|name| state.handle(name))
            .collect())
    }

    async fn request_new_port(
        &self,
        picker: &dyn PortPicker,
    ) -> Result<PortHandle, SliplineError> {
        let offered: Vec<PortInfo> = {
            let mut state = self.lock();
            state.calls.push(TransportCall::RequestNewPort);
            state.ports.iter().map(|p| p.info.clone()).collect()
        };

        match picker.pick(&offered).await {
            PortChoice::Selected(i) => {
                let info = offered.get(i).ok_or(SliplineError::NoDeviceSelected)?;
                let mut state = self.lock();
                if !state.granted.contains(&info.name) {
                    state.granted.push(info.name.clone());
                }
                Ok(PortHandle::new(info.name.clone(), info.clone()))
            }
            PortChoice::Nothing => Err(SliplineError::NoDeviceSelected),
            PortChoice::Cancelled => Err(SliplineError::AuthorizationDenied),
        }
    }

    async fn open(
        &self,
        port: &PortHandle,
        params: &LineParams,
    ) -> Result<OpenPort, SliplineError> {
        let name = port.id().to_string();
        let mut state = self.lock();
        state.calls.push(TransportCall::Open {
            port: name.clone(),
            baud: params.baud_rate,
        });

        let behavior = state
            .behavior(&name)
            .ok_or_else(|| SliplineError::OpenFailed(format!("{} not found", name)))?;
        if state.open.contains_key(&name) {
            return Err(SliplineError::OpenFailed(format!("{} is already open", name)));
        }
        if let PortBehavior::FailsOpen(reason) = &behavior {
            return Err(SliplineError::OpenFailed(reason.clone()));
        }

        state.open.insert(name.clone(), params.baud_rate);

        let writer = match behavior {
            PortBehavior::NoWriter => None,
            _ => Some(Box::new(SimWriter {
                state: self.state.clone(),
                port: name,
                baud: params.baud_rate,
            }) as Box<dyn PortWriter>),
        };

        Ok(OpenPort {
            reader: Some(Box::new(SimReader {
                state: self.state.clone(),
            })),
            writer,
        })
    }

    async fn close(&self, port: &PortHandle) -> Result<(), SliplineError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Close {
            port: port.id().to_string(),
        });
        state.open.remove(port.id());
        Ok(())
    }
}

// ============================================================================
// STREAMS
// ============================================================================

struct SimWriter {
    state: Arc<Mutex<SimState>>,
    port: String,
    baud: u32,
}

#[async_trait]
impl PortWriter for SimWriter {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), SliplineError> {
        // Let other tasks run between chunks, like a real device would.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.open.get(&self.port) != Some(&self.baud) {
            return Err(SliplineError::Transport(format!("{} is closed", self.port)));
        }
        if let Some(PortBehavior::WritesOnlyAt(baud)) = state.behavior(&self.port) {
            if baud != self.baud {
                return Err(SliplineError::Transport(format!(
                    "no response at {} baud",
                    self.baud
                )));
            }
        }

        state.writes.push(WriteRecord {
            port: self.port.clone(),
            baud: self.baud,
            data: data.to_vec(),
        });
        Ok(())
    }

    async fn release(&mut self) -> Result<(), SliplineError> {
        Ok(())
    }
}

struct SimReader {
    state: Arc<Mutex<SimState>>,
}

#[async_trait]
impl PortReader for SimReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SliplineError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let n = buf.len().min(state.input.len());
        for (slot, byte) in buf.iter_mut().zip(state.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn release(&mut self) -> Result<(), SliplineError> {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
