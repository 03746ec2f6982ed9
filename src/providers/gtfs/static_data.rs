use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::error::FeedError;
use crate::board::{ArrivalEvent, Direction, UNKNOWN_DESTINATION};

// --- Input row types (one per static dataset record) ---

/// A stop record from stops.txt.
#[derive(Debug, Clone)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_name: String,
}

/// A trip record from trips.txt.
///
/// `headsign` and `direction_id` are optional in the feed; rows missing
/// either simply contribute less to the index.
#[derive(Debug, Clone)]
pub struct TripRow {
    pub trip_id: String,
    pub route_id: String,
    pub direction_id: Option<Direction>,
    pub headsign: Option<String>,
}

/// The in-memory static reference index. Read-only after construction.
///
/// Real-time trip identifiers are regenerated per service day and often
/// fail to match static trip_ids exactly, so destination lookups run as a
/// priority chain: exact trip match first, then the coarser
/// (route, direction) fallback, then the "Unknown" sentinel.
pub struct StaticIndex {
    pub stop_names: HashMap<String, String>,
    pub headsign_by_trip: HashMap<String, String>,
    pub headsign_by_route_direction: HashMap<(String, Direction), String>,
}

impl StaticIndex {
    /// Build the index from raw rows. Pure transform, no IO.
    ///
    /// Duplicate trip_ids are last-write-wins; duplicate (route, direction)
    /// keys are first-write-wins so branching routes keep a stable fallback.
    pub fn build(stop_rows: Vec<StopRow>, trip_rows: Vec<TripRow>) -> Self {
        let mut stop_names = HashMap::new();
        for row in stop_rows {
            stop_names.insert(row.stop_id, row.stop_name);
        }

        let mut headsign_by_trip = HashMap::new();
        let mut headsign_by_route_direction: HashMap<(String, Direction), String> = HashMap::new();
        for row in trip_rows {
            let Some(headsign) = row.headsign else {
                continue;
            };
            if let Some(direction) = row.direction_id {
                headsign_by_route_direction
                    .entry((row.route_id.clone(), direction))
                    .or_insert_with(|| headsign.clone());
            }
            headsign_by_trip.insert(row.trip_id, headsign);
        }

        Self {
            stop_names,
            headsign_by_trip,
            headsign_by_route_direction,
        }
    }

    /// Resolve the rider-facing destination for an arrival event.
    /// Tried in order, first hit wins; falls back to the sentinel.
    pub fn destination(&self, event: &ArrivalEvent) -> &str {
        self.headsign_by_trip
            .get(&event.trip_id)
            .or_else(|| {
                self.headsign_by_route_direction
                    .get(&(event.route_id.clone(), event.direction))
            })
            .map(String::as_str)
            .unwrap_or(UNKNOWN_DESTINATION)
    }

    /// Station name for a platform id, falling back to the raw id.
    pub fn station_name(&self, stop_id: &str) -> String {
        self.stop_names
            .get(stop_id)
            .cloned()
            .unwrap_or_else(|| stop_id.to_string())
    }
}

// --- Loading ---

/// Load the static reference index from a GTFS directory.
/// Fatal if either file is missing or has no usable header; individual
/// malformed rows are skipped.
pub fn load(dir: &Path) -> Result<StaticIndex, FeedError> {
    let stops_file = std::fs::File::open(dir.join("stops.txt"))?;
    let stop_rows = parse_stop_rows(stops_file)?;
    info!(count = stop_rows.len(), "Parsed static stops");

    let trips_file = std::fs::File::open(dir.join("trips.txt"))?;
    let trip_rows = parse_trip_rows(trips_file)?;
    info!(count = trip_rows.len(), "Parsed static trips");

    let index = StaticIndex::build(stop_rows, trip_rows);
    info!(
        stops = index.stop_names.len(),
        trip_headsigns = index.headsign_by_trip.len(),
        route_direction_headsigns = index.headsign_by_route_direction.len(),
        "Built static reference index"
    );
    Ok(index)
}

pub fn parse_stop_rows<R: Read>(reader: R) -> Result<Vec<StopRow>, FeedError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let idx_id = headers
        .iter()
        .position(|h| h == "stop_id")
        .ok_or_else(|| FeedError::Static("stops.txt missing stop_id".into()))?;
    let idx_name = headers
        .iter()
        .position(|h| h == "stop_name")
        .ok_or_else(|| FeedError::Static("stops.txt missing stop_name".into()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        let stop_id = record.get(idx_id).unwrap_or("").to_string();
        let stop_name = record.get(idx_name).unwrap_or("").to_string();
        if stop_id.is_empty() || stop_name.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(StopRow { stop_id, stop_name });
    }
    if skipped > 0 {
        warn!(skipped, "Skipped stops.txt records (empty/unparseable)");
    }
    Ok(rows)
}

pub fn parse_trip_rows<R: Read>(reader: R) -> Result<Vec<TripRow>, FeedError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let idx_trip = headers
        .iter()
        .position(|h| h == "trip_id")
        .ok_or_else(|| FeedError::Static("trips.txt missing trip_id".into()))?;
    let idx_route = headers
        .iter()
        .position(|h| h == "route_id")
        .ok_or_else(|| FeedError::Static("trips.txt missing route_id".into()))?;
    let idx_headsign = headers.iter().position(|h| h == "trip_headsign");
    let idx_dir = headers.iter().position(|h| h == "direction_id");

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        let trip_id = record.get(idx_trip).unwrap_or("").to_string();
        let route_id = record.get(idx_route).unwrap_or("").to_string();
        if trip_id.is_empty() || route_id.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(TripRow {
            trip_id,
            route_id,
            direction_id: idx_dir
                .and_then(|i| record.get(i))
                .and_then(|s| s.parse::<u32>().ok())
                .and_then(Direction::from_gtfs),
            headsign: idx_headsign
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        });
    }
    if skipped > 0 {
        warn!(skipped, "Skipped trips.txt records (empty/unparseable)");
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_row(trip_id: &str, route_id: &str, direction: Direction, headsign: &str) -> TripRow {
        TripRow {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
            direction_id: Some(direction),
            headsign: Some(headsign.to_string()),
        }
    }

    fn event(trip_id: &str, route_id: &str, direction: Direction) -> ArrivalEvent {
        ArrivalEvent {
            stop_id: "635N".to_string(),
            route_id: route_id.to_string(),
            direction,
            trip_id: trip_id.to_string(),
            arrival_time: 0,
        }
    }

    #[test]
    fn trip_lookup_wins_over_fallback() {
        let index = StaticIndex::build(
            vec![],
            vec![trip_row("trip_a", "6", Direction::North, "Pelham Bay Park")],
        );
        // Poison the fallback with a different headsign for the same route
        let mut index = index;
        index
            .headsign_by_route_direction
            .insert(("6".to_string(), Direction::North), "Somewhere Else".to_string());

        let ev = event("trip_a", "6", Direction::North);
        assert_eq!(index.destination(&ev), "Pelham Bay Park");
    }

    #[test]
    fn route_direction_fallback_when_trip_unknown() {
        let index = StaticIndex::build(
            vec![],
            vec![trip_row("static_trip", "6", Direction::North, "Pelham Bay Park")],
        );
        let ev = event("realtime_trip_with_new_id", "6", Direction::North);
        assert_eq!(index.destination(&ev), "Pelham Bay Park");
    }

    #[test]
    fn unknown_sentinel_when_nothing_matches() {
        let index = StaticIndex::build(vec![], vec![]);
        let ev = event("ghost", "Q", Direction::South);
        assert_eq!(index.destination(&ev), UNKNOWN_DESTINATION);
    }

    #[test]
    fn duplicate_trip_id_last_write_wins() {
        let index = StaticIndex::build(
            vec![],
            vec![
                trip_row("dup", "6", Direction::North, "First"),
                trip_row("dup", "6", Direction::North, "Second"),
            ],
        );
        assert_eq!(index.headsign_by_trip["dup"], "Second");
    }

    #[test]
    fn route_direction_first_write_wins() {
        let index = StaticIndex::build(
            vec![],
            vec![
                trip_row("t1", "5", Direction::South, "Flatbush Av"),
                trip_row("t2", "5", Direction::South, "New Lots Av"),
            ],
        );
        assert_eq!(
            index.headsign_by_route_direction[&("5".to_string(), Direction::South)],
            "Flatbush Av"
        );
    }

    #[test]
    fn rows_without_headsign_skip_indexes() {
        let index = StaticIndex::build(
            vec![],
            vec![TripRow {
                trip_id: "bare".to_string(),
                route_id: "6".to_string(),
                direction_id: Some(Direction::North),
                headsign: None,
            }],
        );
        assert!(index.headsign_by_trip.is_empty());
        assert!(index.headsign_by_route_direction.is_empty());
    }

    #[test]
    fn station_name_falls_back_to_id() {
        let index = StaticIndex::build(
            vec![StopRow {
                stop_id: "635N".to_string(),
                stop_name: "14 St-Union Sq".to_string(),
            }],
            vec![],
        );
        assert_eq!(index.station_name("635N"), "14 St-Union Sq");
        assert_eq!(index.station_name("X99X"), "X99X");
    }

    #[test]
    fn parse_stop_rows_skips_malformed_records() {
        let csv = "\
stop_id,stop_name
635,14 St-Union Sq
,Missing Id
636,
L03,Union Sq-14 St
";
        let rows = parse_stop_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stop_id, "635");
        assert_eq!(rows[1].stop_id, "L03");
    }

    #[test]
    fn parse_stop_rows_missing_column_is_fatal() {
        let csv = "stop_code,stop_name\n1,Somewhere\n";
        let result = parse_stop_rows(csv.as_bytes());
        assert!(matches!(result, Err(FeedError::Static(_))));
    }

    #[test]
    fn parse_trip_rows_reads_optional_fields() {
        let csv = "\
route_id,service_id,trip_id,trip_headsign,direction_id
6,Weekday,trip_1,Pelham Bay Park,0
L,Weekday,trip_2,Canarsie-Rockaway Pkwy,1
6,Weekday,trip_3,,0
6,Weekday,trip_4,Brooklyn Bridge,
";
        let rows = parse_trip_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].direction_id, Some(Direction::North));
        assert_eq!(rows[1].direction_id, Some(Direction::South));
        assert_eq!(rows[2].headsign, None);
        assert_eq!(rows[3].direction_id, None);
        assert_eq!(rows[3].headsign.as_deref(), Some("Brooklyn Bridge"));
    }

    #[test]
    fn build_from_parsed_rows_end_to_end() {
        let stops = "\
stop_id,stop_name
635N,14 St-Union Sq
";
        let trips = "\
route_id,service_id,trip_id,trip_headsign,direction_id
6,Weekday,AFA24GEN-6038-Weekday-00_119150_6..N03R,Pelham Bay Park,0
";
        let index = StaticIndex::build(
            parse_stop_rows(stops.as_bytes()).unwrap(),
            parse_trip_rows(trips.as_bytes()).unwrap(),
        );
        let ev = event("regenerated-id", "6", Direction::North);
        assert_eq!(index.destination(&ev), "Pelham Bay Park");
        assert_eq!(index.station_name("635N"), "14 St-Union Sq");
    }
}
