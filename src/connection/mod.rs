//! # Connection Manager
//!
//! Owns the single printer session and moves it between states:
//!
//! | Operation | From | To | Prompts user |
//! |-----------|------|----|--------------|
//! | [`quick_reconnect`](ConnectionManager::quick_reconnect) | Idle | Open | never |
//! | [`connect`](ConnectionManager::connect) | Idle | Open | only if no granted port works |
//! | [`disconnect`](ConnectionManager::disconnect) | any | Idle | no |
//! | [`force_reset`](ConnectionManager::force_reset) | any | Idle | no |
//! | [`negotiate_baud`](ConnectionManager::negotiate_baud) | Open | Open | no |
//!
//! ## Serialization
//!
//! The session lives behind a `tokio::sync::Mutex`. Every transition and
//! every print holds it for its whole duration, so two operations never
//! interleave and one document's bytes are never mixed with another's.
//!
//! ## Failure Reporting
//!
//! Connection operations return a [`ConnectionStatus`] rather than an
//! error: a missing printer is a normal runtime condition.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use slipline::connection::{ConnectionManager, ManagerOptions};
//! use slipline::store::MemoryStore;
//! use slipline::transport::mock::{MockTransport, PortBehavior};
//! use slipline::transport::PortInfo;
//!
//! # async fn example() {
//! let transport = MockTransport::new()
//!     .with_granted_port(PortInfo::new("A"), PortBehavior::Works);
//! let manager = ConnectionManager::new(
//!     Arc::new(transport),
//!     Arc::new(MemoryStore::new()),
//!     ManagerOptions::default(),
//! );
//!
//! // No record yet, so this fails without prompting.
//! assert!(!manager.quick_reconnect().await.connected);
//! # }
//! ```

mod batch;
mod candidates;
mod state;
mod status;

pub use candidates::candidate_order;
pub use state::ConnectionState;
pub use status::{
    BaudAttempt, ConnectionStatus, JobOutcome, NegotiationReport, PersistentConnectionInfo,
};

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::document::PrintDocument;
use crate::error::SliplineError;
use crate::printer::{BAUD_CANDIDATES, DEFAULT_BAUD, PrinterProfile};
use crate::protocol::commands;
use crate::store::{ConnectionIdentity, ConnectionRecord, ConnectionStore, is_fresh};
use crate::templates::{AssignmentSlip, BagLabel, OrderRecord};
use crate::transport::{
    LineParams, PortHandle, PortPicker, PortReader, PortWriter, Transport,
};
use state::Session;

/// Tunables for a [`ConnectionManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerOptions {
    /// Baud used by quick reconnect and full connect
    pub default_baud: u32,
    /// Tried in order by [`ConnectionManager::negotiate_baud`]
    pub baud_candidates: Vec<u32>,
    /// Pause between jobs of a batch
    pub inter_job_delay: Duration,
    /// Largest single write handed to the port
    pub write_chunk_size: usize,
    pub profile: PrinterProfile,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            default_baud: DEFAULT_BAUD,
            baud_candidates: BAUD_CANDIDATES.to_vec(),
            inter_job_delay: Duration::from_secs(5),
            write_chunk_size: 512,
            profile: PrinterProfile::default(),
        }
    }
}

/// Single owner of the printer session. Share it with `Arc`.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ConnectionStore>,
    options: ManagerOptions,
    session: Arc<Mutex<Session>>,
}

impl ConnectionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ConnectionStore>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            transport,
            store,
            options,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// `true` when a `connected` record younger than a day is stored.
    pub fn has_persistent_connection(&self) -> bool {
        self.usable_record().is_some()
    }

    pub fn persistent_connection_info(&self) -> Option<PersistentConnectionInfo> {
        self.usable_record()
            .map(|record| PersistentConnectionInfo::from(&record))
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Open
    }

    pub async fn state(&self) -> ConnectionState {
        self.session.lock().await.state()
    }

    /// Name of the open port, if any.
    pub async fn port_name(&self) -> Option<String> {
        let session = self.session.lock().await;
        session.port.as_ref().map(|p| p.info().name.clone())
    }

    /// Baud of the open port, if any.
    pub async fn baud(&self) -> Option<u32> {
        let session = self.session.lock().await;
        session.port.as_ref().map(|_| session.baud)
    }

    fn usable_record(&self) -> Option<ConnectionRecord> {
        self.store
            .load()
            .filter(|record| record.connected && is_fresh(record, Utc::now()))
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Reopen the remembered printer without any user interaction.
    pub async fn quick_reconnect(&self) -> ConnectionStatus {
        let mut session = self.session.lock().await;
        self.quick_reconnect_locked(&mut session).await.into()
    }

    async fn quick_reconnect_locked(&self, session: &mut Session) -> Result<(), SliplineError> {
        match session.state() {
            ConnectionState::Open => return Ok(()),
            ConnectionState::Degraded => {
                self.teardown(session).await;
            }
            ConnectionState::Idle => {}
        }

        let record = self
            .usable_record()
            .ok_or(SliplineError::NoPersistentConnection { last_error: None })?;

        let ports = self
            .transport
            .enumerate()
            .await
            .map_err(|e| SliplineError::no_persistent(e.to_string()))?;
        let order = candidate_order(Some(record.saved_index), ports.len());

        let index = self
            .scan(session, &ports, &order)
            .await
            .map_err(|e| SliplineError::no_persistent(e.to_string()))?;

        if index != record.saved_index {
            info!(saved = record.saved_index, index, "Printer moved in enumeration order");
        }
        self.remember(&ports[index], index);
        Ok(())
    }

    /// Connect, prompting through `picker` only if no granted port works.
    pub async fn connect(&self, picker: &dyn PortPicker) -> ConnectionStatus {
        let mut session = self.session.lock().await;
        self.connect_locked(&mut session, picker).await.into()
    }

    async fn connect_locked(
        &self,
        session: &mut Session,
        picker: &dyn PortPicker,
    ) -> Result<(), SliplineError> {
        match session.state() {
            ConnectionState::Open => return Ok(()),
            ConnectionState::Degraded => {
                self.teardown(session).await;
            }
            ConnectionState::Idle => {}
        }

        let ports = self.transport.enumerate().await?;
        let saved = self.usable_record().map(|record| record.saved_index);
        let order = candidate_order(saved, ports.len());

        match self.scan(session, &ports, &order).await {
            Ok(index) => {
                info!(port = ports[index].id(), index, "Reusing previously granted port");
                self.remember(&ports[index], index);
                return Ok(());
            }
            Err(e) => debug!(error = %e, "No granted port usable, asking user"),
        }

        let port = self.transport.request_new_port(picker).await?;
        let baud = self.options.default_baud;
        let (reader, writer) = self.open_with_writer(&port, baud).await?;
        session.install(port.clone(), reader, writer, baud);
        info!(port = port.id(), baud, "Printer connected");

        // The new port may not have been in the earlier snapshot.
        let index = match self.transport.enumerate().await {
            Ok(fresh) => fresh.iter().position(|p| p.id() == port.id()),
            Err(e) => {
                warn!(error = %e, "Enumeration after connect failed");
                None
            }
        };
        let index = index.unwrap_or_else(|| {
            warn!(port = port.id(), "Connected port not in enumeration, saving index 0");
            0
        });
        self.remember(&port, index);
        Ok(())
    }

    /// Release the writer and reader, close the port and forget the record.
    /// Calling it with nothing open succeeds.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        let was_open = session.port.is_some();

        if let Some(e) = self.teardown(&mut session).await {
            warn!(error = %e, "Error while disconnecting");
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear connection record");
        }
        if was_open {
            info!("Printer disconnected");
        }
    }

    /// Drop the in-memory session no matter what, keeping the record so a
    /// quick reconnect can follow.
    pub async fn force_reset(&self) {
        let mut session = self.session.lock().await;
        if let Some(e) = self.teardown(&mut session).await {
            debug!(error = %e, "Ignored error during force reset");
        }
        info!("Session reset");
    }

    /// Find a baud rate the printer answers at by reopening the held port at
    /// each candidate and writing the init sequence.
    ///
    /// Diagnostic only. If no rate works the session ends up Idle; the
    /// persisted record is left alone.
    pub async fn negotiate_baud(&self) -> Result<NegotiationReport, SliplineError> {
        let mut session = self.session.lock().await;
        let port = session.port.clone().ok_or(SliplineError::NotConnected)?;
        let mut report = NegotiationReport::default();

        for &baud in &self.options.baud_candidates {
            self.teardown(&mut session).await;

            let (reader, mut writer) = match self.open_with_writer(&port, baud).await {
                Ok(streams) => streams,
                Err(e) => {
                    debug!(port = port.id(), baud, error = %e, "Baud rejected");
                    report.attempts.push(BaudAttempt {
                        baud,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };
            session.port = Some(port.clone());
            session.reader = reader;
            session.baud = baud;

            match writer.write_all(&commands::init()).await {
                Ok(()) => {
                    session.writer = Some(writer);
                    report.attempts.push(BaudAttempt { baud, error: None });
                    report.baud = Some(baud);
                    info!(port = port.id(), baud, "Baud negotiated");
                    return Ok(report);
                }
                Err(e) => {
                    debug!(port = port.id(), baud, error = %e, "No response at baud");
                    let _ = writer.release().await;
                    report.attempts.push(BaudAttempt {
                        baud,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        self.teardown(&mut session).await;
        warn!(port = port.id(), "No baud rate worked");
        Ok(report)
    }

    // ========================================================================
    // PRINTING
    // ========================================================================

    /// Write one document, in order, while holding the session.
    ///
    /// The write runs on its own task, so dropping the returned future does
    /// not cut the document short. A failed write leaves the session
    /// Degraded.
    pub async fn print_document(&self, doc: &PrintDocument) -> Result<(), SliplineError> {
        let bytes = doc.to_bytes();
        let template = doc.template().to_string();
        let chunk_size = self.options.write_chunk_size;

        let mut session = self.session.clone().lock_owned().await;
        if session.writer.is_none() {
            return Err(SliplineError::NotConnected);
        }

        let job = tokio::spawn(async move {
            let Some(writer) = session.writer.as_mut() else {
                return Err(SliplineError::NotConnected);
            };
            if let Err(e) = write_chunked(&mut **writer, &bytes, chunk_size).await {
                warn!(template = %template, error = %e, "Print failed, writer released");
                if let Some(mut writer) = session.writer.take() {
                    let _ = writer.release().await;
                }
                return Err(e);
            }

            info!(template = %template, bytes = bytes.len(), "Document printed");
            Ok(())
        });

        job.await
            .map_err(|e| SliplineError::Transport(format!("print task failed: {}", e)))?
    }

    pub async fn print_assignment_slip(&self, slip: &AssignmentSlip) -> Result<(), SliplineError> {
        self.print_document(&slip.render(&self.options.profile)).await
    }

    pub async fn print_bag_label(&self, label: &BagLabel) -> Result<(), SliplineError> {
        self.print_document(&label.render(&self.options.profile)?).await
    }

    pub async fn print_order_record(&self, record: &OrderRecord) -> Result<(), SliplineError> {
        self.print_document(&record.render(&self.options.profile)?).await
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Try each candidate at the default baud; install the first that yields
    /// a writer and return its index.
    async fn scan(
        &self,
        session: &mut Session,
        ports: &[PortHandle],
        order: &[usize],
    ) -> Result<usize, SliplineError> {
        let baud = self.options.default_baud;
        let mut last_error = SliplineError::AllCandidatesFailed("no granted ports".into());

        for &index in order {
            let port = &ports[index];
            debug!(port = port.id(), index, baud, "Trying candidate");

            match self.open_with_writer(port, baud).await {
                Ok((reader, writer)) => {
                    session.install(port.clone(), reader, writer, baud);
                    info!(port = port.id(), index, baud, "Printer connected");
                    return Ok(index);
                }
                Err(e) => {
                    debug!(port = port.id(), index, error = %e, "Candidate failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Open `port` and take its writer. A port without a writer is closed
    /// again and reported as [`SliplineError::WriterUnavailable`].
    async fn open_with_writer(
        &self,
        port: &PortHandle,
        baud: u32,
    ) -> Result<(Option<Box<dyn PortReader>>, Box<dyn PortWriter>), SliplineError> {
        let opened = self.transport.open(port, &LineParams::with_baud(baud)).await?;

        match opened.writer {
            Some(writer) => Ok((opened.reader, writer)),
            None => {
                if let Some(mut reader) = opened.reader {
                    let _ = reader.release().await;
                }
                if let Err(e) = self.transport.close(port).await {
                    debug!(port = port.id(), error = %e, "Close after missing writer failed");
                }
                Err(SliplineError::WriterUnavailable)
            }
        }
    }

    /// Release writer, release reader, close port. Always leaves the
    /// session Idle and returns the first error seen.
    async fn teardown(&self, session: &mut Session) -> Option<SliplineError> {
        let mut first_error = None;

        if let Some(mut writer) = session.writer.take() {
            if let Err(e) = writer.release().await {
                first_error.get_or_insert(e);
            }
        }
        if let Some(mut reader) = session.reader.take() {
            if let Err(e) = reader.release().await {
                first_error.get_or_insert(e);
            }
        }
        if let Some(port) = session.port.take() {
            if let Err(e) = self.transport.close(&port).await {
                first_error.get_or_insert(e);
            }
        }

        session.clear();
        first_error
    }

    /// Persist `port` at `index` as the last working connection.
    fn remember(&self, port: &PortHandle, index: usize) {
        let record =
            ConnectionRecord::connected(ConnectionIdentity::from(port.info()), index, Utc::now());
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "Failed to save connection record");
        }
    }
}

async fn write_chunked(
    writer: &mut dyn PortWriter,
    bytes: &[u8],
    chunk_size: usize,
) -> Result<(), SliplineError> {
    for chunk in bytes.chunks(chunk_size.max(1)) {
        writer.write_all(chunk).await?;
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
