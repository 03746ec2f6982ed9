//! Core arrivals-board pipeline.
//!
//! Decoded feed events flow through destination resolution, grouping by
//! (platform, direction) with minutes-until-arrival, pagination into
//! fixed-size display pages, and a rotating cycler over the result.

pub mod aggregate;
pub mod cycle;
pub mod paginate;

pub use aggregate::aggregate;
pub use cycle::{Cycler, NavAction, Position};
pub use paginate::{paginate, total_pages};

use serde::Serialize;
use utoipa::ToSchema;

/// Sentinel destination when neither lookup tier matches.
pub const UNKNOWN_DESTINATION: &str = "Unknown";

/// The route family whose directions are named geographically rather than
/// by compass. The L runs crosstown, so "Northbound" would mislead riders.
const GEOGRAPHIC_ROUTE: &str = "L";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// GTFS direction_id 0
    North,
    /// GTFS direction_id 1
    South,
}

impl Direction {
    pub fn from_gtfs(direction_id: u32) -> Option<Self> {
        match direction_id {
            0 => Some(Direction::North),
            1 => Some(Direction::South),
            _ => None,
        }
    }

    /// Infer direction from the platform id suffix ("635N" / "635S").
    /// Feed trip descriptors frequently omit direction_id.
    pub fn from_platform_suffix(stop_id: &str) -> Option<Self> {
        if stop_id.ends_with('N') {
            Some(Direction::North)
        } else if stop_id.ends_with('S') {
            Some(Direction::South)
        } else {
            None
        }
    }

    /// Rider-facing direction label for a route.
    pub fn label_for_route(self, route_id: &str) -> &'static str {
        if route_id == GEOGRAPHIC_ROUTE {
            match self {
                Direction::North => "Manhattan Bound",
                Direction::South => "Brooklyn Bound",
            }
        } else {
            match self {
                Direction::North => "Northbound",
                Direction::South => "Southbound",
            }
        }
    }
}

/// Route-family label used by the display for icon styling.
pub fn line_type(route_id: &str) -> &'static str {
    if route_id == GEOGRAPHIC_ROUTE {
        "L Train"
    } else {
        "Other Lines"
    }
}

/// One normalized arrival extracted from a real-time feed entity.
/// Rebuilt from scratch every polling cycle, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalEvent {
    pub stop_id: String,
    pub route_id: String,
    pub direction: Direction,
    pub trip_id: String,
    /// Absolute arrival time, epoch seconds.
    pub arrival_time: i64,
}

/// One train entry as served to the display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrainEntry {
    pub route: String,
    pub minutes: f64,
    pub destination: String,
}

/// All arrivals for one (platform, direction), sorted soonest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformGroup {
    pub stop_id: String,
    pub direction_label: &'static str,
    pub line_type: &'static str,
    pub trains: Vec<TrainEntry>,
}

/// One display page of a platform group.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BoardPage {
    /// Human-readable station name
    pub station: String,
    /// Physical platform identifier
    pub station_id: String,
    /// Compass or geographic direction label
    pub direction: String,
    /// Route-family label for icon styling
    pub line_type: String,
    /// 1-based page number within the group
    pub page: usize,
    pub total_pages: usize,
    pub trains: Vec<TrainEntry>,
}
