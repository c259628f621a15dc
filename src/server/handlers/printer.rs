//! Connection handlers.
//!
//! Every connection route answers `200` with a [`ConnectionStatus`] body,
//! even when the printer could not be reached.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::connection::{
    ConnectionState, ConnectionStatus, NegotiationReport, PersistentConnectionInfo,
};
use crate::transport::NamedPortPicker;

use super::super::state::AppState;

/// Response for GET /api/printer/status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub connected: bool,
    pub state: ConnectionState,
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub has_persistent_connection: bool,
    pub persistent_connection: Option<PersistentConnectionInfo>,
}

/// GET /api/printer/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<PrinterStatus> {
    let manager = &state.manager;
    let session_state = manager.state().await;
    let persistent = manager.persistent_connection_info();

    Json(PrinterStatus {
        connected: session_state == ConnectionState::Open,
        state: session_state,
        port: manager.port_name().await,
        baud: manager.baud().await,
        has_persistent_connection: persistent.is_some(),
        persistent_connection: persistent,
    })
}

/// POST /api/printer/quick-reconnect
pub async fn quick_reconnect(State(state): State<Arc<AppState>>) -> Json<ConnectionStatus> {
    Json(state.manager.quick_reconnect().await)
}

/// Request body for POST /api/printer/connect.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    /// Port the user picked in the host UI. Without it, only ports granted
    /// earlier can be used.
    #[serde(default)]
    pub port: Option<String>,
}

/// POST /api/printer/connect
pub async fn connect(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ConnectRequest>>,
) -> Json<ConnectionStatus> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let picker = NamedPortPicker::new(request.port);
    Json(state.manager.connect(&picker).await)
}

/// POST /api/printer/disconnect
pub async fn disconnect(State(state): State<Arc<AppState>>) -> Json<ConnectionStatus> {
    state.manager.disconnect().await;
    Json(ConnectionStatus {
        connected: false,
        error: None,
    })
}

/// POST /api/printer/force-reset
pub async fn force_reset(State(state): State<Arc<AppState>>) -> Json<ConnectionStatus> {
    state.manager.force_reset().await;
    Json(ConnectionStatus {
        connected: false,
        error: None,
    })
}

/// POST /api/printer/diagnose - run baud negotiation on the open port.
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NegotiationReport>, (StatusCode, String)> {
    state
        .manager
        .negotiate_baud()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::CONFLICT, e.to_string()))
}
