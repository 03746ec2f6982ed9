use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::board::{BoardPage, NavAction, Position};
use crate::sync::types::{CycleHandle, SnapshotStore};

#[derive(Clone)]
pub struct BoardState {
    pub snapshot_store: SnapshotStore,
    pub cycle_handle: CycleHandle,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    /// All display pages in group order
    pub pages: Vec<BoardPage>,
    /// When the data was last refreshed; null before the first poll succeeds
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of platform groups on the board
    pub total_sections: usize,
    /// Current rotation position
    pub position: Position,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub action: NavAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigateResponse {
    pub position: Position,
    /// Automatic rotation is suspended until the pause window expires
    pub paused: bool,
}

/// Full board state for the display client
#[utoipa::path(
    get,
    path = "/api/board",
    responses(
        (status = 200, description = "Current board pages and rotation position", body = BoardResponse)
    ),
    tag = "board"
)]
pub async fn get_board(State(state): State<BoardState>) -> Json<BoardResponse> {
    let snapshot = state.snapshot_store.read().await.clone();
    let position = state.cycle_handle.lock().await.position();

    Json(BoardResponse {
        pages: snapshot.pages.clone(),
        last_updated: snapshot.last_updated,
        total_sections: snapshot.total_sections(),
        position,
    })
}

/// Manually navigate the display, pausing automatic rotation
#[utoipa::path(
    post,
    path = "/api/board/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Position after the navigation step", body = NavigateResponse)
    ),
    tag = "board"
)]
pub async fn navigate(
    State(state): State<BoardState>,
    Json(request): Json<NavigateRequest>,
) -> Json<NavigateResponse> {
    let snapshot = state.snapshot_store.read().await.clone();
    let now = Utc::now();

    let mut cycler = state.cycle_handle.lock().await;
    cycler.navigate(request.action, &snapshot.group_page_counts, now);

    Json(NavigateResponse {
        position: cycler.position(),
        paused: cycler.is_paused(now),
    })
}

pub fn router(snapshot_store: SnapshotStore, cycle_handle: CycleHandle) -> Router {
    let state = BoardState {
        snapshot_store,
        cycle_handle,
    };
    Router::new()
        .route("/", get(get_board))
        .route("/navigate", post(navigate))
        .with_state(state)
}
