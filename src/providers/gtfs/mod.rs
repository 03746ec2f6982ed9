//! GTFS data providers: real-time protobuf feeds plus the static
//! reference dataset they are joined against.

pub mod error;
pub mod realtime;
pub mod static_data;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::board::ArrivalEvent;
use crate::config::FeedGroup;
use error::FeedError;

/// HTTP client wrapper for the real-time feed endpoints.
pub struct FeedClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl FeedClient {
    pub fn new(api_key: Option<String>) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent("subway-board/0.1")
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Fetch one feed group and decode it into arrival events.
    pub async fn fetch_arrivals(
        &self,
        feed: &FeedGroup,
        platform_filter: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArrivalEvent>, FeedError> {
        let message = realtime::fetch_feed(&self.client, &feed.url, self.api_key.as_deref()).await?;
        Ok(realtime::decode_arrivals(&message, platform_filter, now))
    }
}
