//! Sampler configuration from environment variables

use std::env;
use std::fmt;
use std::str::FromStr;

/// Watchlist membership policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A discovery category seeds a persistent watchlist; items age out
    /// after `max_age_hours`.
    Discovery,
    /// No persistent watchlist; each tick samples exactly the items ranked
    /// this tick, tagged with the tick number.
    Snapshot,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Discovery => write!(f, "discovery"),
            Mode::Snapshot => write!(f, "snapshot"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the sampler daemon
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Membership policy (see [`Mode`])
    pub mode: Mode,

    /// Seconds between sampling rounds
    pub sample_interval_secs: u64,

    /// Discovery mode: drop an item once it is older than this many hours
    pub max_age_hours: i64,

    /// Rank lists are truncated to this many entries
    pub max_rank: usize,

    /// Categories contributing rank columns, in output column order
    pub categories: Vec<String>,

    /// Discovery mode: category whose snapshot seeds the watchlist
    pub discovery_category: String,

    /// Ceiling on in-flight item detail fetches per round
    pub max_concurrent_fetches: usize,

    /// Base URL of the source API
    pub api_base: String,

    /// Per-request timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Append samples to this file instead of stdout
    pub output_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RANKFLOW_MODE` (default: discovery)
    /// - `RANKFLOW_SAMPLE_INTERVAL_SECS` (default: 60)
    /// - `RANKFLOW_MAX_AGE_HOURS` (default: 48)
    /// - `RANKFLOW_MAX_RANK` (default: 500)
    /// - `RANKFLOW_CATEGORIES` (default: top, comma-separated)
    /// - `RANKFLOW_DISCOVERY_CATEGORY` (default: new)
    /// - `RANKFLOW_MAX_CONCURRENT_FETCHES` (default: 10)
    /// - `RANKFLOW_API_BASE` (default: https://hacker-news.firebaseio.com/v0)
    /// - `RANKFLOW_FETCH_TIMEOUT_SECS` (default: 10)
    /// - `RANKFLOW_OUTPUT_PATH` (default: unset, write to stdout)
    ///
    /// A variable that is set but does not parse is an error, not a silent
    /// fallback to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode_str = env::var("RANKFLOW_MODE").unwrap_or_else(|_| "discovery".to_string());
        let mode = match mode_str.to_lowercase().as_str() {
            "discovery" => Mode::Discovery,
            "snapshot" => Mode::Snapshot,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "RANKFLOW_MODE must be 'discovery' or 'snapshot', got '{}'",
                    other
                )))
            }
        };

        let sample_interval_secs = parse_var("RANKFLOW_SAMPLE_INTERVAL_SECS", 60u64)?;
        if sample_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_SAMPLE_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        let max_age_hours = parse_var("RANKFLOW_MAX_AGE_HOURS", 48i64)?;
        if max_age_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_MAX_AGE_HOURS must be positive".to_string(),
            ));
        }

        let max_rank = parse_var("RANKFLOW_MAX_RANK", 500usize)?;
        if max_rank == 0 {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_MAX_RANK must be at least 1".to_string(),
            ));
        }

        let categories_raw =
            env::var("RANKFLOW_CATEGORIES").unwrap_or_else(|_| "top".to_string());
        let categories: Vec<String> = categories_raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_CATEGORIES must name at least one category".to_string(),
            ));
        }
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                return Err(ConfigError::InvalidValue(format!(
                    "RANKFLOW_CATEGORIES lists '{}' more than once",
                    category
                )));
            }
        }

        let discovery_category =
            env::var("RANKFLOW_DISCOVERY_CATEGORY").unwrap_or_else(|_| "new".to_string());
        if discovery_category.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_DISCOVERY_CATEGORY cannot be empty".to_string(),
            ));
        }

        let max_concurrent_fetches = parse_var("RANKFLOW_MAX_CONCURRENT_FETCHES", 10usize)?;
        if max_concurrent_fetches == 0 {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_MAX_CONCURRENT_FETCHES must be at least 1".to_string(),
            ));
        }

        let api_base = env::var("RANKFLOW_API_BASE")
            .unwrap_or_else(|_| "https://hacker-news.firebaseio.com/v0".to_string());
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_API_BASE must start with http:// or https://".to_string(),
            ));
        }

        let fetch_timeout_secs = parse_var("RANKFLOW_FETCH_TIMEOUT_SECS", 10u64)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "RANKFLOW_FETCH_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let output_path = env::var("RANKFLOW_OUTPUT_PATH").ok().filter(|s| !s.is_empty());

        Ok(Self {
            mode,
            sample_interval_secs,
            max_age_hours,
            max_rank,
            categories,
            discovery_category,
            max_concurrent_fetches,
            api_base,
            fetch_timeout_secs,
            output_path,
        })
    }

    /// Retention window in seconds (discovery mode)
    pub fn max_age_secs(&self) -> i64 {
        self.max_age_hours * 3600
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("{} has unparsable value '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
