//! # Printer Transport Layer
//!
//! This module defines the capability the connection manager needs from a
//! serial backend, and the backends that provide it.
//!
//! ## Available Transports
//!
//! - [`serial`]: OS serial ports via the `serialport` crate
//! - [`mock`]: In-memory simulated ports for tests and demos
//!
//! ## Authorization Model
//!
//! A transport only enumerates ports the user has granted before. Granting
//! a new port goes through [`Transport::request_new_port`], which takes a
//! [`PortPicker`]: the picker is the user's gesture, so code paths that
//! must never prompt simply have no picker to pass.

pub mod mock;
pub mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

use async_trait::async_trait;
use std::fmt;

use crate::error::SliplineError;
use crate::printer::DEFAULT_BAUD;

// ============================================================================
// PORT HANDLES
// ============================================================================

/// Coarse, displayable description of a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// OS name, e.g. `/dev/ttyUSB0` or `COM3`
    pub name: String,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl PortInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor_id: None,
            product_id: None,
        }
    }

    pub fn usb(name: impl Into<String>, vendor_id: u16, product_id: u16) -> Self {
        Self {
            name: name.into(),
            vendor_id: Some(vendor_id),
            product_id: Some(product_id),
        }
    }
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.vendor_id, self.product_id) {
            (Some(vid), Some(pid)) => write!(f, "{} ({:04x}:{:04x})", self.name, vid, pid),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// Opaque reference to one serial endpoint.
///
/// Handles compare equal when they refer to the same endpoint. They are
/// deliberately not serializable; only the coarse identity is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortHandle {
    id: String,
    info: PortInfo,
}

impl PortHandle {
    /// Used by transports to mint handles.
    pub fn new(id: impl Into<String>, info: PortInfo) -> Self {
        Self {
            id: id.into(),
            info,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &PortInfo {
        &self.info
    }
}

// ============================================================================
// LINE PARAMETERS
// ============================================================================

/// Serial framing. This printer family always runs 8N1 without flow
/// control; only the baud rate varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParams {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
}

impl LineParams {
    /// 8N1, no flow control, at `baud_rate`.
    pub fn with_baud(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl Default for LineParams {
    fn default() -> Self {
        Self::with_baud(DEFAULT_BAUD)
    }
}

// ============================================================================
// OPEN PORT STREAMS
// ============================================================================

/// Exclusive write side of an open port.
#[async_trait]
pub trait PortWriter: Send {
    /// Write every byte, in order.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), SliplineError>;

    /// Give the write side back to the port before it is closed.
    async fn release(&mut self) -> Result<(), SliplineError>;
}

/// Read side of an open port.
#[async_trait]
pub trait PortReader: Send {
    /// Read available bytes. `Ok(0)` means nothing arrived in time.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SliplineError>;

    async fn release(&mut self) -> Result<(), SliplineError>;
}

/// Streams returned by [`Transport::open`].
///
/// Either side may be missing: a port can open while its writer is
/// unavailable, which the connection manager treats as a failed candidate.
pub struct OpenPort {
    pub reader: Option<Box<dyn PortReader>>,
    pub writer: Option<Box<dyn PortWriter>>,
}

// ============================================================================
// USER GESTURE
// ============================================================================

/// Outcome of showing the user a port chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortChoice {
    /// Index into the offered list
    Selected(usize),
    /// Chooser closed without a selection
    Nothing,
    /// User explicitly cancelled
    Cancelled,
}

/// Presents ports to the user. Holding one means a user action is in
/// progress.
#[async_trait]
pub trait PortPicker: Send + Sync {
    async fn pick(&self, ports: &[PortInfo]) -> PortChoice;
}

/// Picks the offered port whose name matches, as chosen in a host UI.
pub struct NamedPortPicker {
    name: Option<String>,
}

impl NamedPortPicker {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }
}

#[async_trait]
impl PortPicker for NamedPortPicker {
    async fn pick(&self, ports: &[PortInfo]) -> PortChoice {
        match &self.name {
            Some(name) => ports
                .iter()
                .position(|p| &p.name == name)
                .map(PortChoice::Selected)
                .unwrap_or(PortChoice::Nothing),
            None => PortChoice::Nothing,
        }
    }
}

// ============================================================================
// TRANSPORT TRAIT
// ============================================================================

/// Serial backend capability.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` by the connection manager and the HTTP server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Ports granted earlier, in a stable-ish order. Empty is not an error.
    async fn enumerate(&self) -> Result<Vec<PortHandle>, SliplineError>;

    /// Ask the user to grant a new port.
    ///
    /// ## Errors
    ///
    /// - [`SliplineError::AuthorizationDenied`] if the picker was cancelled
    /// - [`SliplineError::NoDeviceSelected`] if nothing was chosen
    async fn request_new_port(&self, picker: &dyn PortPicker)
    -> Result<PortHandle, SliplineError>;

    /// Open `port` with `params`.
    ///
    /// ## Errors
    ///
    /// [`SliplineError::OpenFailed`] when the device is busy, missing, or
    /// rejects the parameters.
    async fn open(&self, port: &PortHandle, params: &LineParams)
    -> Result<OpenPort, SliplineError>;

    /// Close `port`. Closing a port that is not open is a no-op.
    async fn close(&self, port: &PortHandle) -> Result<(), SliplineError>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_params_are_8n1_9600() {
        let p = LineParams::default();
        assert_eq!(p.baud_rate, 9600);
        assert_eq!(p.data_bits, 8);
        assert_eq!(p.stop_bits, 1);
        assert_eq!(p.parity, Parity::None);
        assert_eq!(p.flow_control, FlowControl::None);
    }

    #[test]
    fn test_port_info_display() {
        assert_eq!(PortInfo::new("COM3").to_string(), "COM3");
        assert_eq!(
            PortInfo::usb("/dev/ttyUSB0", 0x0416, 0x5011).to_string(),
            "/dev/ttyUSB0 (0416:5011)"
        );
    }

    #[tokio::test]
    async fn test_named_picker() {
        let ports = vec![PortInfo::new("a"), PortInfo::new("b")];
        let picker = NamedPortPicker::new(Some("b".into()));
        assert_eq!(picker.pick(&ports).await, PortChoice::Selected(1));

        let picker = NamedPortPicker::new(Some("zzz".into()));
        assert_eq!(picker.pick(&ports).await, PortChoice::Nothing);

        let picker = NamedPortPicker::new(None);
        assert_eq!(picker.pick(&ports).await, PortChoice::Nothing);
    }
}
