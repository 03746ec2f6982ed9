use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::providers::gtfs::static_data::StaticIndex;
use crate::sync::types::SnapshotStore;

#[derive(Clone)]
pub struct HealthState {
    pub snapshot_store: SnapshotStore,
    pub static_index: Arc<StaticIndex>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Whether the service is running
    pub healthy: bool,
    /// Number of stops in the static reference index
    pub static_stop_count: usize,
    /// Number of trip-level headsign mappings in the static index
    pub static_trip_headsign_count: usize,
    /// Number of platform groups currently on the board
    pub board_section_count: usize,
    /// Number of display pages currently published
    pub board_page_count: usize,
    /// When the board was last refreshed; null before the first poll
    pub last_updated: Option<DateTime<Utc>>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let snapshot = state.snapshot_store.read().await.clone();

    Json(HealthResponse {
        healthy: true,
        static_stop_count: state.static_index.stop_names.len(),
        static_trip_headsign_count: state.static_index.headsign_by_trip.len(),
        board_section_count: snapshot.total_sections(),
        board_page_count: snapshot.pages.len(),
        last_updated: snapshot.last_updated,
    })
}

pub fn router(snapshot_store: SnapshotStore, static_index: Arc<StaticIndex>) -> Router {
    let state = HealthState {
        snapshot_store,
        static_index,
    };
    Router::new().route("/", get(health_check)).with_state(state)
}
