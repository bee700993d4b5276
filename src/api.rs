use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::model::{Listing, SourceStatus};
use crate::store::SpawnStore;

pub const SERVICE_MESSAGE: &str = "Blox Fruits Boss Monitor API";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SpawnStore>,
}

impl AppState {
    pub fn new(store: Arc<SpawnStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/all", get(all_spawns))
        .route("/api/{source}", get(source_spawns))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct RootResp {
    status: &'static str,
    message: &'static str,
    total_messages: u64,
    endpoints: BTreeMap<String, String>,
}

async fn root(State(state): State<AppState>) -> Json<RootResp> {
    let (total, statuses) = state.store.summary();
    let mut endpoints: BTreeMap<String, String> = statuses
        .into_iter()
        .map(|s| {
            (
                format!("/api/{}", s.key),
                format!("{} spawns ({} active)", s.name, s.active_spawns),
            )
        })
        .collect();
    endpoints.insert("/api/all".to_string(), "All boss spawns".to_string());

    Json(RootResp {
        status: "running",
        message: SERVICE_MESSAGE,
        total_messages: total,
        endpoints,
    })
}

async fn source_spawns(State(state): State<AppState>, Path(source): Path<String>) -> Response {
    match state.store.listing(&source) {
        Some(listing) => Json(listing).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unknown source", "source": source })),
        )
            .into_response(),
    }
}

async fn all_spawns(State(state): State<AppState>) -> Json<Listing> {
    Json(state.store.all_listing())
}

#[derive(Serialize)]
struct HealthResp {
    status: &'static str,
    total_messages: u64,
    channels: BTreeMap<String, SourceStatus>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let (total, statuses) = state.store.summary();
    let channels = statuses.into_iter().map(|s| (s.key.clone(), s)).collect();
    Json(HealthResp {
        status: "healthy",
        total_messages: total,
        channels,
    })
}
