//! # HTTP Server for the Host UI
//!
//! Exposes the connection manager and the templates as a small JSON API.
//!
//! ## Usage
//!
//! ```bash
//! slipline serve --listen 127.0.0.1:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | GET | `/api/printer/status` | | session and persisted connection |
//! | POST | `/api/printer/quick-reconnect` | | `ConnectionStatus` |
//! | POST | `/api/printer/connect` | `{"port": "..."}` (optional) | `ConnectionStatus` |
//! | POST | `/api/printer/disconnect` | | `ConnectionStatus` |
//! | POST | `/api/printer/force-reset` | | `ConnectionStatus` |
//! | POST | `/api/printer/diagnose` | | `NegotiationReport` |
//! | POST | `/api/print/:template` | template fields | `{"success": true, ...}` |
//! | POST | `/api/print/batch` | `{"jobs": [{"template", "fields"}]}` | `[JobOutcome]` |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::connection::ConnectionManager;
use crate::error::SliplineError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Connection API
        .route("/api/printer/status", get(handlers::printer::status))
        .route(
            "/api/printer/quick-reconnect",
            post(handlers::printer::quick_reconnect),
        )
        .route("/api/printer/connect", post(handlers::printer::connect))
        .route("/api/printer/disconnect", post(handlers::printer::disconnect))
        .route("/api/printer/force-reset", post(handlers::printer::force_reset))
        .route("/api/printer/diagnose", post(handlers::printer::diagnose))
        // Print API
        .route("/api/print/batch", post(handlers::print::batch))
        .route("/api/print/:template", post(handlers::print::print))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use slipline::server::{serve, ServerConfig};
/// use slipline::connection::{ConnectionManager, ManagerOptions};
/// use slipline::store::MemoryStore;
/// use slipline::transport::SerialTransport;
///
/// # async fn example() -> Result<(), slipline::SliplineError> {
/// let manager = Arc::new(ConnectionManager::new(
///     Arc::new(SerialTransport::new(None)),
///     Arc::new(MemoryStore::new()),
///     ManagerOptions::default(),
/// ));
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:8080".to_string(),
/// };
///
/// serve(config, manager).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(
    config: ServerConfig,
    manager: Arc<ConnectionManager>,
) -> Result<(), SliplineError> {
    let app = router(Arc::new(AppState::new(manager)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            SliplineError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(addr = %config.listen_addr, "slipline HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| SliplineError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ManagerOptions;
    use crate::store::MemoryStore;
    use crate::transport::PortInfo;
    use crate::transport::mock::{MockTransport, PortBehavior};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(transport: &MockTransport) -> Router {
        let manager = Arc::new(ConnectionManager::new(
            Arc::new(transport.clone()),
            Arc::new(MemoryStore::new()),
            ManagerOptions::default(),
        ));
        router(Arc::new(AppState::new(manager)))
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_status_when_idle() {
        let app = app(&MockTransport::new());
        let request = Request::get("/api/printer/status").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["connected"], false);
        assert_eq!(body["state"], "idle");
        assert_eq!(body["hasPersistentConnection"], false);
    }

    #[tokio::test]
    async fn test_connect_with_picked_port_then_print() {
        let transport =
            MockTransport::new().with_pickable_port(PortInfo::new("COM3"), PortBehavior::Works);
        let app = app(&transport);

        let (status, body) =
            post_json(&app, "/api/printer/connect", serde_json::json!({ "port": "COM3" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "connected": true }));

        let (status, body) = post_json(
            &app,
            "/api/print/bag-label",
            serde_json::json!({
                "orderNumber": "9",
                "customer": "Lin",
                "bagNumber": 1,
                "bagCount": 1,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "bag-label");
        assert!(!transport.written_bytes("COM3").is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_choice_reports_no_device() {
        let transport =
            MockTransport::new().with_pickable_port(PortInfo::new("COM3"), PortBehavior::Works);
        let (_, body) =
            post_json(&app(&transport), "/api/printer/connect", serde_json::json!({})).await;
        assert_eq!(
            body,
            serde_json::json!({ "connected": false, "error": "NoDeviceSelected" })
        );
    }

    #[tokio::test]
    async fn test_print_unknown_template() {
        let (status, _) =
            post_json(&app(&MockTransport::new()), "/api/print/ripple", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_print_when_not_connected() {
        let (status, _) = post_json(
            &app(&MockTransport::new()),
            "/api/print/bag-label",
            serde_json::json!({
                "orderNumber": "9",
                "customer": "Lin",
                "bagNumber": 1,
                "bagCount": 1,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_print_overflowing_order_is_bad_request() {
        let (status, _) = post_json(
            &app(&MockTransport::new()),
            "/api/print/order-record",
            serde_json::json!({
                "orderNumber": "1",
                "customer": "Ada",
                "items": [{ "description": "Rug", "quantity": 4000000000u32, "unitPriceCents": 9000000000000i64 }],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_diagnose_requires_connection() {
        let (status, _) =
            post_json(&app(&MockTransport::new()), "/api/printer/diagnose", serde_json::json!({}))
                .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
