//! Error types for the sampling pipeline
//!
//! Failure severity is encoded in the type: a `FetchError` is a single
//! request gone wrong, an `AggregationError` abandons the whole round, an
//! `ItemSampleError` is confined to one item. None of them terminate the
//! process.

use crate::api::ItemId;

#[derive(Debug)]
pub enum FetchError {
    /// Network-level failure, including connect errors and timeouts
    Transport(reqwest::Error),
    /// Server answered with a non-success HTTP status
    Status(reqwest::StatusCode),
    /// Body was not the JSON shape we asked for
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {}", e),
            FetchError::Status(code) => write!(f, "unexpected HTTP status: {}", code),
            FetchError::Parse(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// A category list fetch failed, so no rank data exists for this tick.
///
/// The round that hit this is abandoned without touching the watchlist.
#[derive(Debug)]
pub struct AggregationError {
    pub category: String,
    pub source: FetchError,
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to fetch list for category '{}': {}",
            self.category, self.source
        )
    }
}

impl std::error::Error for AggregationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// One item's detail fetch failed; the rest of the tick is unaffected.
#[derive(Debug)]
pub struct ItemSampleError {
    pub id: ItemId,
    pub source: FetchError,
}

impl std::fmt::Display for ItemSampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to sample item {}: {}", self.id, self.source)
    }
}

impl std::error::Error for ItemSampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
