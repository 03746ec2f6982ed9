use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use prost::Message;
use tracing::debug;

use super::error::FeedError;
use crate::board::{ArrivalEvent, Direction};

/// Maximum allowed protobuf response size (50 MB)
const MAX_PROTOBUF_SIZE: usize = 50 * 1024 * 1024;

/// Fetch and decode one GTFS-RT protobuf feed group.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
) -> Result<gtfs_realtime::FeedMessage, FeedError> {
    let mut request = client
        .get(url)
        .timeout(std::time::Duration::from_secs(30));
    if let Some(key) = api_key {
        request = request.header("x-api-key", key);
    }
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(FeedError::NetworkMessage(format!(
            "GTFS-RT HTTP {}",
            response.status()
        )));
    }

    let bytes = response.bytes().await?;

    if bytes.len() > MAX_PROTOBUF_SIZE {
        return Err(FeedError::NetworkMessage(format!(
            "GTFS-RT response too large: {} bytes (max {} bytes)",
            bytes.len(),
            MAX_PROTOBUF_SIZE
        )));
    }

    gtfs_realtime::FeedMessage::decode(bytes.as_ref()).map_err(FeedError::from)
}

/// Extract normalized arrival events from a decoded feed.
///
/// Only stop_time_updates for monitored platforms are retained; per
/// (entity, platform) the nearest future arrival wins, and entities with
/// no future arrival at a monitored platform contribute nothing (the
/// train already passed or is not yet scheduled there).
pub fn decode_arrivals(
    feed: &gtfs_realtime::FeedMessage,
    platform_filter: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ArrivalEvent> {
    let now_secs = now.timestamp();
    let mut events = Vec::new();

    let mut total_updates = 0u64;
    let mut matched_entities = 0u64;

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            continue;
        };
        total_updates += 1;

        let route_id = trip_update.trip.route_id.clone().unwrap_or_default();
        if route_id.is_empty() {
            continue;
        }
        let trip_id = trip_update.trip.trip_id.clone().unwrap_or_default();

        // Nearest future arrival per monitored platform for this entity
        let mut nearest: HashMap<&str, i64> = HashMap::new();
        for stu in &trip_update.stop_time_update {
            let Some(stop_id) = stu.stop_id.as_deref() else {
                continue;
            };
            if !platform_filter.contains(stop_id) {
                continue;
            }
            let Some(arrival_time) = stu.arrival.as_ref().and_then(|a| a.time) else {
                continue;
            };
            if arrival_time < now_secs {
                continue;
            }
            nearest
                .entry(stop_id)
                .and_modify(|t| *t = (*t).min(arrival_time))
                .or_insert(arrival_time);
        }
        if nearest.is_empty() {
            continue;
        }
        matched_entities += 1;

        for (stop_id, arrival_time) in nearest {
            // Trip descriptors frequently omit direction_id; the platform
            // suffix carries the same information for this agency.
            let direction = trip_update
                .trip
                .direction_id
                .and_then(Direction::from_gtfs)
                .or_else(|| Direction::from_platform_suffix(stop_id));
            let Some(direction) = direction else {
                continue;
            };

            events.push(ArrivalEvent {
                stop_id: stop_id.to_string(),
                route_id: route_id.clone(),
                direction,
                trip_id: trip_id.clone(),
                arrival_time,
            });
        }
    }

    debug!(total_updates, matched_entities, "Decoded feed trip updates");

    events
}
