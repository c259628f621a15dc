//! # OS Serial Port Transport
//!
//! Drives printers attached as USB-serial adapters or native COM/tty ports
//! through the `serialport` crate.
//!
//! ## Grants
//!
//! Desktop operating systems have no per-application serial permission, so
//! this transport keeps its own list of granted port names. The list is
//! stored as a JSON array at `grants_path` (when configured) so quick
//! reconnection works across process restarts:
//!
//! ```json
//! ["/dev/ttyUSB0", "/dev/ttyACM0"]
//! ```
//!
//! [`enumerate`](Transport::enumerate) returns granted ports that are
//! currently present, in grant order.
//!
//! ## Blocking I/O
//!
//! `serialport` is synchronous. Every call that can block (listing, open,
//! write, read) runs on `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use serialport::SerialPortType;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    LineParams, OpenPort, PortChoice, PortHandle, PortInfo, PortPicker, PortReader, PortWriter,
    Transport,
};
use crate::error::SliplineError;

/// Default read/write timeout for opened ports
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

type SharedPort = Arc<Mutex<Box<dyn serialport::SerialPort>>>;

/// # Serial Transport
///
/// ## Example
///
/// ```no_run
/// use slipline::transport::{SerialTransport, Transport, LineParams};
///
/// # async fn example() -> Result<(), slipline::SliplineError> {
/// let transport = SerialTransport::new(Some("grants.json".into()));
/// for port in transport.enumerate().await? {
///     println!("{}", port.info());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SerialTransport {
    grants: Mutex<Vec<String>>,
    grants_path: Option<PathBuf>,
    open_ports: Mutex<HashMap<String, SharedPort>>,
    timeout: Duration,
}

impl SerialTransport {
    /// Create a transport, loading grants from `grants_path` if it exists.
    pub fn new(grants_path: Option<PathBuf>) -> Self {
        let grants = grants_path
            .as_ref()
            .map(|path| load_grants(path))
            .unwrap_or_default();

        Self {
            grants: Mutex::new(grants),
            grants_path,
            open_ports: Mutex::new(HashMap::new()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the port read/write timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Grant a port by name without showing a picker (pre-configured ports).
    pub fn grant(&self, name: &str) -> Result<(), SliplineError> {
        let snapshot = {
            let mut grants = lock(&self.grants);
            if grants.iter().any(|g| g == name) {
                return Ok(());
            }
            grants.push(name.to_string());
            grants.clone()
        };
        info!(port = name, "Serial port granted");
        self.save_grants(&snapshot)
    }

    /// Every port the OS currently reports, granted or not.
    pub async fn available(&self) -> Result<Vec<PortInfo>, SliplineError> {
        tokio::task::spawn_blocking(list_available)
            .await
            .map_err(|e| SliplineError::Transport(format!("Task error: {}", e)))?
    }

    fn save_grants(&self, grants: &[String]) -> Result<(), SliplineError> {
        let Some(path) = &self.grants_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(grants)?;
        fs::write(path, json).map_err(|e| {
            SliplineError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn enumerate(&self) -> Result<Vec<PortHandle>, SliplineError> {
        let available = self.available().await?;
        let grants = lock(&self.grants).clone();

        let ports = grants
            .iter()
            .filter_map(|name| available.iter().find(|p| &p.name == name))
            .map(|info| PortHandle::new(info.name.clone(), info.clone()))
            .collect::<Vec<_>>();

        debug!(granted = grants.len(), present = ports.len(), "Enumerated serial ports");
        Ok(ports)
    }

    async fn request_new_port(
        &self,
        picker: &dyn PortPicker,
    ) -> Result<PortHandle, SliplineError> {
        let available = self.available().await?;

        match picker.pick(&available).await {
            PortChoice::Selected(i) => {
                let info = available
                    .get(i)
                    .cloned()
                    .ok_or(SliplineError::NoDeviceSelected)?;
                self.grant(&info.name)?;
                Ok(PortHandle::new(info.name.clone(), info))
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
        if lock(&self.open_ports).contains_key(port.id()) {
            return Err(SliplineError::OpenFailed(format!(
                "{} is already open",
                port.id()
            )));
        }

        let name = port.id().to_string();
        let params = *params;
        let timeout = self.timeout;
        let serial = tokio::task::spawn_blocking(move || open_blocking(&name, &params, timeout))
            .await
            .map_err(|e| SliplineError::Transport(format!("Task error: {}", e)))??;

        // A reader is optional; the printer is driven write-only.
        let reader = match serial.try_clone() {
            Ok(clone) => Some(Box::new(SerialReader {
                port: Arc::new(Mutex::new(clone)),
            }) as Box<dyn PortReader>),
            Err(e) => {
                warn!(port = port.id(), error = %e, "Could not clone port for reading");
                None
            }
        };

        let shared: SharedPort = Arc::new(Mutex::new(serial));
        lock(&self.open_ports).insert(port.id().to_string(), shared.clone());

        info!(port = port.id(), baud = params.baud_rate, "Serial port opened");

        Ok(OpenPort {
            reader,
            writer: Some(Box::new(SerialWriter { port: shared })),
        })
    }

    async fn close(&self, port: &PortHandle) -> Result<(), SliplineError> {
        if lock(&self.open_ports).remove(port.id()).is_some() {
            info!(port = port.id(), "Serial port closed");
        }
        Ok(())
    }
}

// ============================================================================
// STREAMS
// ============================================================================

struct SerialWriter {
    port: SharedPort,
}

#[async_trait]
impl PortWriter for SerialWriter {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), SliplineError> {
        let port = self.port.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&port);
            guard
                .write_all(&data)
                .map_err(|e| SliplineError::Transport(format!("Write failed: {}", e)))?;
            guard
                .flush()
                .map_err(|e| SliplineError::Transport(format!("Flush failed: {}", e)))
        })
        .await
        .map_err(|e| SliplineError::Transport(format!("Task error: {}", e)))?
    }

    async fn release(&mut self) -> Result<(), SliplineError> {
        Ok(())
    }
}

struct SerialReader {
    port: SharedPort,
}

#[async_trait]
impl PortReader for SerialReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SliplineError> {
        let port = self.port.clone();
        let len = buf.len();

        let chunk = tokio::task::spawn_blocking(move || {
            let mut tmp = vec![0u8; len];
            match lock(&port).read(&mut tmp) {
                Ok(n) => {
                    tmp.truncate(n);
                    Ok(tmp)
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
                Err(e) => Err(SliplineError::Transport(format!("Read failed: {}", e))),
            }
        })
        .await
        .map_err(|e| SliplineError::Transport(format!("Task error: {}", e)))??;

        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    async fn release(&mut self) -> Result<(), SliplineError> {
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn list_available() -> Result<Vec<PortInfo>, SliplineError> {
    let ports = serialport::available_ports()
        .map_err(|e| SliplineError::Transport(format!("Failed to list ports: {}", e)))?;

    Ok(ports
        .into_iter()
        .map(|p| match p.port_type {
            SerialPortType::UsbPort(usb) => PortInfo::usb(p.port_name, usb.vid, usb.pid),
            _ => PortInfo::new(p.port_name),
        })
        .collect())
}

fn open_blocking(
    name: &str,
    params: &LineParams,
    timeout: Duration,
) -> Result<Box<dyn serialport::SerialPort>, SliplineError> {
    let data_bits = match params.data_bits {
        5 => serialport::DataBits::Five,
        6 => serialport::DataBits::Six,
        7 => serialport::DataBits::Seven,
        _ => serialport::DataBits::Eight,
    };
    let stop_bits = match params.stop_bits {
        2 => serialport::StopBits::Two,
        _ => serialport::StopBits::One,
    };

    serialport::new(name, params.baud_rate)
        .data_bits(data_bits)
        .stop_bits(stop_bits)
        .parity(serialport::Parity::None)
        .flow_control(serialport::FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|e| {
            SliplineError::OpenFailed(format!("{} @ {}: {}", name, params.baud_rate, e))
        })
}

/// Read the grant list. A missing or corrupt file means no grants.
fn load_grants(path: &Path) -> Vec<String> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&contents) {
        Ok(grants) => grants,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable grants file");
            Vec::new()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
