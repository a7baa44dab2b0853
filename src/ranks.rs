//! Rank aggregation across category lists
//!
//! Each tick every configured category list is fetched concurrently and
//! reduced to a `RankMap`. The maps live only for the duration of the tick.

use crate::api::{ItemId, SourceApi};
use crate::error::AggregationError;
use futures::future::join_all;
use std::collections::HashMap;

/// Item ID to 1-based rank within one category's list, truncated to the
/// configured depth
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankMap {
    ranks: HashMap<ItemId, u32>,
}

impl RankMap {
    /// Reduce an ordered ID list to a rank map
    ///
    /// Only the first `max_rank` entries are considered; rank is the 1-based
    /// position in the list. Should the source ever repeat an ID, the first
    /// occurrence keeps its rank and later ones are ignored.
    pub fn from_snapshot(ids: &[ItemId], max_rank: usize) -> Self {
        let mut ranks = HashMap::with_capacity(ids.len().min(max_rank));
        for (idx, &id) in ids.iter().take(max_rank).enumerate() {
            ranks.entry(id).or_insert(idx as u32 + 1);
        }
        Self { ranks }
    }

    pub fn rank_of(&self, id: ItemId) -> Option<u32> {
        self.ranks.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ranks.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ranks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Fetch every category list concurrently and build one `RankMap` per
/// category
///
/// All-or-nothing: if any single list fetch fails the whole aggregation
/// fails, so a tick never proceeds on partial rank data. The error names
/// the category that broke.
pub async fn aggregate(
    api: &dyn SourceApi,
    categories: &[String],
    max_rank: usize,
) -> Result<HashMap<String, RankMap>, AggregationError> {
    let fetches = categories.iter().map(|category| async move {
        (category.as_str(), api.list_ids(category).await)
    });
    let results = join_all(fetches).await;

    let mut maps = HashMap::with_capacity(categories.len());
    for (category, result) in results {
        match result {
            Ok(ids) => {
                maps.insert(category.to_string(), RankMap::from_snapshot(&ids, max_rank));
            }
            Err(source) => {
                return Err(AggregationError {
                    category: category.to_string(),
                    source,
                })
            }
        }
    }

    Ok(maps)
}
