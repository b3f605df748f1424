//! HTTP surface over the publisher facets and the manual trigger.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use meterwatch_coordinator::Coordinator;

/// Application state shared across routes.
pub struct GatewayState {
    pub coordinator: Arc<Coordinator>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/meter", get(get_meter))
        .route("/api/status", get(get_status))
        .route("/api/last-reading", get(get_last_reading))
        .route("/api/read", post(read_now))
        .with_state(state)
}

/// Run the HTTP server on the given address until the process exits.
pub async fn start_server(addr: SocketAddr, state: Arc<GatewayState>) -> Result<()> {
    let app = build_router(state).layer(TraceLayer::new_for_http());
    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Value facet: latest reading (or last known good) plus diagnostics.
async fn get_meter(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let publisher = state.coordinator.publisher();
    Json(json!({
        "value": publisher.value().await,
        "unit": "m³",
        "available": publisher.has_value().await,
        "attributes": publisher.attributes().await,
    }))
}

/// Status facet: "success", "error", or "unknown" before the first cycle.
async fn get_status(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let publisher = state.coordinator.publisher();
    Json(json!({
        "status": publisher.status().await,
        "lastError": publisher.last_error().await,
    }))
}

/// Last-reading facet: formatted completion time of the latest cycle.
async fn get_last_reading(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let publisher = state.coordinator.publisher();
    Json(json!({ "lastReading": publisher.last_reading().await }))
}

/// Manual trigger: run one cycle now, republish, return the fresh result.
/// Not throttled by the poll interval.
async fn read_now(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    info!("Manual read triggered via gateway");
    let result = state.coordinator.read_now().await;
    Json(serde_json::to_value(&result).unwrap_or_else(|_| json!({ "status": "error" })))
}
