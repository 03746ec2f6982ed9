use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::board::{BoardPage, Cycler, Position};

/// One immutable published board state. Readers clone the Arc and keep a
/// consistent view while the next polling cycle builds its replacement.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    /// All display pages, flat, in group order.
    pub pages: Vec<BoardPage>,
    /// Page count per platform group, in the same group order.
    pub group_page_counts: Vec<usize>,
    /// When the snapshot was built. None until the first successful poll.
    pub last_updated: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    /// Number of platform groups on the board.
    pub fn total_sections(&self) -> usize {
        self.group_page_counts.len()
    }

    /// Resolve a cycler position to its flat page, if it exists.
    pub fn page_at(&self, position: Position) -> Option<&BoardPage> {
        if position.group >= self.group_page_counts.len() {
            return None;
        }
        let offset: usize = self.group_page_counts[..position.group].iter().sum();
        if position.page >= self.group_page_counts[position.group] {
            return None;
        }
        self.pages.get(offset + position.page)
    }
}

/// Shared handle to the latest snapshot; publication swaps the inner Arc.
pub type SnapshotStore = Arc<RwLock<Arc<BoardSnapshot>>>;

/// Shared handle to the display rotation state. Single mutex: both the
/// auto-tick loop and the navigation endpoint mutate it.
pub type CycleHandle = Arc<Mutex<Cycler>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TrainEntry;

    fn page(station_id: &str, page: usize, total: usize) -> BoardPage {
        BoardPage {
            station: station_id.to_string(),
            station_id: station_id.to_string(),
            direction: "Northbound".to_string(),
            line_type: "Other Lines".to_string(),
            page,
            total_pages: total,
            trains: vec![TrainEntry {
                route: "6".to_string(),
                minutes: 2.5,
                destination: "Pelham Bay Park".to_string(),
            }],
        }
    }

    #[test]
    fn page_at_maps_group_and_page_to_flat_index() {
        let snapshot = BoardSnapshot {
            pages: vec![page("635N", 1, 2), page("635N", 2, 2), page("L03N", 1, 1)],
            group_page_counts: vec![2, 1],
            last_updated: None,
        };

        let p = snapshot.page_at(Position { group: 0, page: 1 }).unwrap();
        assert_eq!(p.station_id, "635N");
        assert_eq!(p.page, 2);

        let p = snapshot.page_at(Position { group: 1, page: 0 }).unwrap();
        assert_eq!(p.station_id, "L03N");
    }

    #[test]
    fn page_at_rejects_out_of_range_positions() {
        let snapshot = BoardSnapshot {
            pages: vec![page("635N", 1, 1)],
            group_page_counts: vec![1],
            last_updated: None,
        };
        assert!(snapshot.page_at(Position { group: 1, page: 0 }).is_none());
        assert!(snapshot.page_at(Position { group: 0, page: 1 }).is_none());
    }

    #[test]
    fn empty_snapshot_has_no_sections() {
        let snapshot = BoardSnapshot::default();
        assert_eq!(snapshot.total_sections(), 0);
        assert!(snapshot.page_at(Position { group: 0, page: 0 }).is_none());
    }
}
