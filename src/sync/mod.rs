//! Background synchronization: polls the real-time feeds, rebuilds the
//! board snapshot, and drives the automatic display rotation.

pub mod types;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::board::{aggregate, paginate, total_pages, Cycler, PlatformGroup};
use crate::config::Config;
use crate::providers::gtfs::error::FeedError;
use crate::providers::gtfs::static_data::StaticIndex;
use crate::providers::gtfs::FeedClient;
use types::{BoardSnapshot, CycleHandle, SnapshotStore};

pub struct BoardSync {
    client: FeedClient,
    config: Config,
    static_index: Arc<StaticIndex>,
    platform_filter: HashSet<String>,
    snapshot: SnapshotStore,
    cycler: CycleHandle,
}

impl BoardSync {
    pub fn new(config: Config, static_index: Arc<StaticIndex>) -> Result<Self, FeedError> {
        let client = FeedClient::new(config.api_key.clone())?;
        let platform_filter = config.stops.iter().cloned().collect();
        let cycler = Arc::new(Mutex::new(Cycler::new(config.board.pause_secs)));
        Ok(Self {
            client,
            config,
            static_index,
            platform_filter,
            snapshot: Arc::new(RwLock::new(Arc::new(BoardSnapshot::default()))),
            cycler,
        })
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        Arc::clone(&self.snapshot)
    }

    pub fn cycle_handle(&self) -> CycleHandle {
        Arc::clone(&self.cycler)
    }

    /// Spawn the polling loop and the rotation tick loop.
    pub fn start(self: &Arc<Self>) {
        let sync = Arc::clone(self);
        let poll_secs = self.config.board.poll_interval_secs;
        tokio::spawn(async move {
            loop {
                let ok = sync.refresh().await;
                // Back off to double the interval after a cycle where
                // every feed failed, matching upstream rate expectations.
                let sleep_secs = if ok { poll_secs } else { poll_secs * 2 };
                tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
            }
        });

        let sync = Arc::clone(self);
        let cycle_secs = self.config.board.cycle_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(cycle_secs));
            interval.tick().await;
            loop {
                interval.tick().await;
                let snapshot = sync.snapshot.read().await.clone();
                let mut cycler = sync.cycler.lock().await;
                cycler.auto_tick(&snapshot.group_page_counts, Utc::now());
            }
        });
    }

    /// Run one polling cycle. Returns false when every feed failed, in
    /// which case the previous snapshot stays published.
    pub async fn refresh(&self) -> bool {
        let now = Utc::now();

        let fetches = self
            .config
            .feeds
            .iter()
            .map(|feed| self.client.fetch_arrivals(feed, &self.platform_filter, now));
        let results = join_all(fetches).await;

        let mut events = Vec::new();
        let mut failures = 0usize;
        for (feed, result) in self.config.feeds.iter().zip(results) {
            match result {
                Ok(mut feed_events) => events.append(&mut feed_events),
                Err(err) => {
                    failures += 1;
                    warn!(feed = %feed.id, error = %err, "Feed fetch failed");
                }
            }
        }

        if failures == self.config.feeds.len() {
            warn!("All feeds failed; keeping previous board snapshot");
            return false;
        }

        let groups = aggregate(
            &events,
            now,
            &self.static_index,
            &self.config.stops,
            self.config.board.lookahead_minutes,
        );
        let snapshot = build_snapshot(
            &groups,
            self.config.board.page_size,
            &self.static_index,
            now,
        );
        info!(
            sections = snapshot.total_sections(),
            pages = snapshot.pages.len(),
            failed_feeds = failures,
            "Published board snapshot"
        );

        let snapshot = Arc::new(snapshot);
        {
            let mut cycler = self.cycler.lock().await;
            cycler.clamp(&snapshot.group_page_counts);
        }
        *self.snapshot.write().await = snapshot;
        true
    }
}

/// Paginate aggregated groups into a publishable snapshot.
pub fn build_snapshot(
    groups: &[PlatformGroup],
    page_size: usize,
    index: &StaticIndex,
    now: DateTime<Utc>,
) -> BoardSnapshot {
    let group_page_counts = groups
        .iter()
        .map(|g| total_pages(g.trains.len(), page_size))
        .collect();
    BoardSnapshot {
        pages: paginate(groups, page_size, index),
        group_page_counts,
        last_updated: Some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TrainEntry;

    fn group(stop_id: &str, count: usize) -> PlatformGroup {
        PlatformGroup {
            stop_id: stop_id.to_string(),
            direction_label: "Northbound",
            line_type: "Other Lines",
            trains: (0..count)
                .map(|n| TrainEntry {
                    route: "6".to_string(),
                    minutes: n as f64,
                    destination: "Pelham Bay Park".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn snapshot_counts_match_pagination() {
        let index = StaticIndex::build(vec![], vec![]);
        let now = Utc::now();
        let snapshot = build_snapshot(&[group("635N", 7), group("L03N", 3)], 5, &index, now);

        assert_eq!(snapshot.group_page_counts, vec![2, 1]);
        assert_eq!(snapshot.pages.len(), 3);
        assert_eq!(snapshot.total_sections(), 2);
        assert_eq!(snapshot.last_updated, Some(now));
    }

    #[test]
    fn empty_board_snapshot_is_well_formed() {
        let index = StaticIndex::build(vec![], vec![]);
        let snapshot = build_snapshot(&[], 5, &index, Utc::now());
        assert!(snapshot.pages.is_empty());
        assert!(snapshot.group_page_counts.is_empty());
    }
}
