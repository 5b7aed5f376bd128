//! Relay HTTP/WebSocket server
//!
//! - `POST /action` accepts one action record, stamps it, broadcasts it
//! - `GET /` and `GET /ws` upgrade to a viewer WebSocket
//! - `GET /health` reports liveness and the number of connected viewers

use crate::broadcaster::Broadcaster;
use crate::config::RelayConfig;
use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared relay state
pub struct RelayState {
    pub broadcaster: Broadcaster,
    pub config: RelayConfig,
}

/// Relay server
#[derive(Clone)]
pub struct RelayServer {
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a new relay with its own connection registry
    pub fn new(config: RelayConfig) -> Self {
        Self {
            state: Arc::new(RelayState {
                broadcaster: Broadcaster::new(config.queue_capacity),
                config,
            }),
        }
    }

    pub fn state(&self) -> Arc<RelayState> {
        self.state.clone()
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();

        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if origins.is_empty() {
            layer.allow_origin(Any)
        } else {
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(ws_handler))
            .route("/ws", get(ws_handler))
            .route("/action", post(ingest_handler))
            .route("/health", get(health_handler))
            .fallback(not_found_handler)
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves. Live
    /// viewer connections are closed on shutdown.
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Relay listening on http://{}", listener.local_addr()?);

        let state = self.state.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                let n = state.broadcaster.close_all();
                info!("Shutting down; closed {} viewer connection(s)", n);
            })
            .await?;

        Ok(())
    }
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}

/// Insert the receipt time unless the producer already supplied one.
///
/// Returns `None` for payloads that are not JSON objects.
pub fn stamp(payload: Value) -> Option<Map<String, Value>> {
    match payload {
        Value::Object(mut map) => {
            if !map.contains_key("timestamp") {
                map.insert(
                    "timestamp".to_string(),
                    Value::String(pagecast_common::iso_timestamp()),
                );
            }
            Some(map)
        }
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pagecast-relay",
        "version": pagecast_common::VERSION,
        "connections": state.broadcaster.connection_count(),
    }))
}

async fn ingest_handler(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(v)) => v,
        Err(rejection) => {
            warn!("Rejected action: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(serde_json::json!({"error": rejection.body_text()})),
            )
                .into_response();
        }
    };

    let Some(stamped) = stamp(payload) else {
        warn!("Rejected action: payload is not a JSON object");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "action payload must be a JSON object"})),
        )
            .into_response();
    };

    let report = state.broadcaster.broadcast(&stamped);
    let stamped_value = Value::Object(stamped.clone());
    info!(
        seq = report.sequence,
        delivered = report.delivered,
        dropped = report.dropped,
        "Broadcasting action: {}",
        stamped_value
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Action broadcasted",
            "data": stamped,
        })),
    )
        .into_response()
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| viewer_session(socket, state))
}

/// Pump broadcast records to one viewer until either side goes away
async fn viewer_session(socket: WebSocket, state: Arc<RelayState>) {
    let sub = state.broadcaster.register();
    let id = sub.id;
    let mut rx = sub.rx;
    info!(
        "Viewer {} connected ({} live)",
        id,
        state.broadcaster.connection_count()
    );

    let (mut ws_write, mut ws_read) = socket.split();

    let writer = async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = ws_write.send(Message::Text(text)).await {
                debug!("Send to viewer {} failed: {}", id, e);
                break;
            }
        }
        let _ = ws_write.close().await;
    };

    // Viewers only listen; anything they send other than close is ignored.
    let reader = async move {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Viewer {} socket error: {}", id, e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = writer => {}
        _ = reader => {}
    }

    state.broadcaster.unregister(id);
    info!("Viewer {} disconnected", id);
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
}
