use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{line_type, ArrivalEvent, PlatformGroup, TrainEntry};
use crate::providers::gtfs::static_data::StaticIndex;

/// Build the ordered platform groups for one polling cycle.
///
/// Arrivals are joined against the static index for destinations, bucketed
/// by (platform, direction label), and windowed to the lookahead horizon. The
/// output is fully deterministic for a given input: trains sort by minutes
/// then trip id, and groups follow the configured platform priority order.
pub fn aggregate(
    events: &[ArrivalEvent],
    now: DateTime<Utc>,
    index: &StaticIndex,
    priority: &[String],
    lookahead_minutes: u32,
) -> Vec<PlatformGroup> {
    let now_secs = now.timestamp();
    let horizon = f64::from(lookahead_minutes);

    struct Bucket {
        line_type: &'static str,
        // (sort key trip_id, entry) pairs until final ordering is applied
        trains: Vec<(String, TrainEntry)>,
    }

    // Direction phrasing depends on the route family, so a platform that
    // sees both an L and a non-L train in the same direction splits into
    // separate groups with their own labels and icon families.
    let mut buckets: HashMap<(String, &'static str), Bucket> = HashMap::new();
    for event in events {
        let minutes = ((event.arrival_time - now_secs) as f64 / 60.0).max(0.0);
        if minutes > horizon {
            continue;
        }
        let direction_label = event.direction.label_for_route(&event.route_id);
        let entry = TrainEntry {
            route: event.route_id.clone(),
            minutes,
            destination: index.destination(event).to_string(),
        };
        buckets
            .entry((event.stop_id.clone(), direction_label))
            .or_insert_with(|| Bucket {
                line_type: line_type(&event.route_id),
                trains: Vec::new(),
            })
            .trains
            .push((event.trip_id.clone(), entry));
    }

    let rank: HashMap<&str, usize> = priority
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut groups: Vec<PlatformGroup> = buckets
        .into_iter()
        .map(|((stop_id, direction_label), mut bucket)| {
            bucket.trains.sort_by(|(trip_a, a), (trip_b, b)| {
                a.minutes
                    .total_cmp(&b.minutes)
                    .then_with(|| trip_a.cmp(trip_b))
            });
            PlatformGroup {
                direction_label,
                line_type: bucket.line_type,
                trains: bucket.trains.into_iter().map(|(_, t)| t).collect(),
                stop_id,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        let rank_a = rank.get(a.stop_id.as_str()).copied().unwrap_or(usize::MAX);
        let rank_b = rank.get(b.stop_id.as_str()).copied().unwrap_or(usize::MAX);
        rank_a
            .cmp(&rank_b)
            .then_with(|| a.stop_id.cmp(&b.stop_id))
            .then_with(|| a.direction_label.cmp(b.direction_label))
    });

    groups
}
