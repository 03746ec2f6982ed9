pub mod board;
pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::providers::gtfs::static_data::StaticIndex;
use crate::sync::types::{CycleHandle, SnapshotStore};

pub fn router(
    snapshot_store: SnapshotStore,
    cycle_handle: CycleHandle,
    static_index: Arc<StaticIndex>,
) -> Router {
    Router::new()
        .nest("/board", board::router(snapshot_store.clone(), cycle_handle))
        .nest("/health", health::router(snapshot_store, static_index))
}
