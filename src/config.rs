use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Real-time feed groups to poll each cycle.
    pub feeds: Vec<FeedGroup>,
    /// Monitored platform ids. The order doubles as the display priority
    /// for platform groups on the board.
    pub stops: Vec<String>,
    /// Directory containing the static GTFS dataset (stops.txt, trips.txt).
    #[serde(default = "Config::default_static_dir")]
    pub static_dir: String,
    /// Optional API key sent as `x-api-key` with every feed request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Board refresh and display settings
    #[serde(default)]
    pub board: BoardConfig,
    /// Allowed CORS origins. Required unless cors_permissive is true.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Explicitly allow all origins (development only). Defaults to false.
    #[serde(default)]
    pub cors_permissive: bool,
}

/// One real-time data source covering a subset of lines.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedGroup {
    pub id: String,
    pub url: String,
}

/// Configuration for the polling loop and the display cycler
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Interval in seconds between feed polling cycles (default: 30)
    #[serde(default = "BoardConfig::default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Only arrivals within this many minutes are shown (default: 10)
    #[serde(default = "BoardConfig::default_lookahead_minutes")]
    pub lookahead_minutes: u32,
    /// Trains shown per page (default: 5)
    #[serde(default = "BoardConfig::default_page_size")]
    pub page_size: usize,
    /// Interval in seconds between automatic display advances (default: 10)
    #[serde(default = "BoardConfig::default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// How long manual navigation suspends automatic cycling (default: 3)
    #[serde(default = "BoardConfig::default_pause_secs")]
    pub pause_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: Self::default_poll_interval_secs(),
            lookahead_minutes: Self::default_lookahead_minutes(),
            page_size: Self::default_page_size(),
            cycle_interval_secs: Self::default_cycle_interval_secs(),
            pause_secs: Self::default_pause_secs(),
        }
    }
}

impl BoardConfig {
    fn default_poll_interval_secs() -> u64 {
        30
    }
    fn default_lookahead_minutes() -> u32 {
        10
    }
    fn default_page_size() -> usize {
        5
    }
    fn default_cycle_interval_secs() -> u64 {
        10
    }
    fn default_pause_secs() -> u64 {
        3
    }
}

impl Config {
    fn default_static_dir() -> String {
        "gtfs_subway".to_string()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.is_empty() {
            return Err(ConfigError::Invalid("no feed groups configured".into()));
        }
        if self.stops.is_empty() {
            return Err(ConfigError::Invalid("no monitored stops configured".into()));
        }
        if self.board.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
