//! Interaction webhook server
//!
//! Discord delivers every interaction as `POST /` with detached
//! Ed25519 signature headers. The raw body must be verified before any
//! parsing happens; unverifiable requests are answered 401 so the
//! platform's endpoint validation probes pass.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::dispatch::{self, WireReply};
use crate::multipart;
use crate::registry::Registry;
use crate::signature;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    public_key: String,
    start_time: SystemTime,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, public_key: impl Into<String>) -> Self {
        Self {
            registry,
            public_key: public_key.into(),
            start_time: SystemTime::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_secs: u64,
}

/// Build the webhook router. Exposed separately from [`serve`] so
/// tests can bind an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_interaction))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Starts the interaction webhook HTTP server.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Interaction webhook server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[instrument(name = "interactions.webhook", skip_all)]
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("x-signature-ed25519")
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get("x-signature-timestamp")
        .and_then(|v| v.to_str().ok());

    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        warn!("Missing signature headers");
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if !signature::verify(&state.public_key, timestamp, &body, signature) {
        warn!("Invalid interaction signature");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match dispatch::dispatch(&state.registry, &body).await {
        WireReply::Reply(reply) if reply.files.is_empty() => Json(reply.response).into_response(),
        WireReply::Reply(reply) => match serde_json::to_string(&reply.response) {
            Ok(payload) => {
                let encoded = multipart::encode(&payload, &reply.files);
                (
                    [(header::CONTENT_TYPE, encoded.content_type)],
                    encoded.body,
                )
                    .into_response()
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize interaction response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        WireReply::Status(status) => status.into_response(),
    }
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let uptime = state.start_time.elapsed().unwrap_or_default().as_secs();
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "ok".to_string(),
            uptime_secs: uptime,
        }),
    )
}
