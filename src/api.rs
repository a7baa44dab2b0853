//! Source API client
//!
//! The feed exposes two kinds of read-only JSON endpoints:
//! - `<base>/<category>stories.json` returns an ordered array of item IDs
//! - `<base>/item/<id>.json` returns the item's current detail record, or
//!   JSON `null` for IDs the server does not know
//!
//! Reference deployment: https://hacker-news.firebaseio.com/v0
//!
//! `SourceApi` is a trait so the sampling pipeline can run against a
//! scripted in-memory source in tests.

use crate::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type ItemId = u64;

/// Mutable item attributes as served by the detail endpoint
///
/// Only the fields the sampler consumes are declared; `score` and
/// `descendants` are absent on some item types (jobs, polls) and default
/// to zero, matching the always-an-integer output contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiItem {
    pub id: ItemId,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: i64,
    /// Submission time, Unix seconds
    pub time: i64,
}

#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Fetch the ordered ID list for one category
    async fn list_ids(&self, category: &str) -> Result<Vec<ItemId>, FetchError>;

    /// Fetch one item's detail record
    async fn item(&self, id: ItemId) -> Result<ApiItem, FetchError>;
}

/// HTTP implementation over one shared client
pub struct HttpSourceApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSourceApi {
    /// Build the client with a per-request timeout; a stalled endpoint shows
    /// up as an ordinary fetch failure, never a hung round.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self, category: &str) -> String {
        format!("{}/{}stories.json", self.base_url, category)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }
}

#[async_trait]
impl SourceApi for HttpSourceApi {
    async fn list_ids(&self, category: &str) -> Result<Vec<ItemId>, FetchError> {
        let response = self.client.get(self.list_url(category)).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let ids: Vec<ItemId> = response.json().await?;
        Ok(ids)
    }

    async fn item(&self, id: ItemId) -> Result<ApiItem, FetchError> {
        let response = self.client.get(self.item_url(id)).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        // The server answers `null` for unknown or purged IDs
        let item: Option<ApiItem> = response.json().await?;
        item.ok_or_else(|| FetchError::Parse(format!("item {} returned null body", id)))
    }
}
