//! Per-item sampling: the concurrent detail fan-out and the Sample record
//!
//! One tick turns the working set into detail fetches running at most
//! `max_in_flight` at a time. Each item resolves to its own
//! `Result`, so one dead item cannot take the rest of the tick with it.

use crate::api::{ApiItem, ItemId, SourceApi};
use crate::error::ItemSampleError;
use crate::ranks::RankMap;
use futures::stream::{self, Stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

/// One observation of one item, immutable once assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: ItemId,
    pub score: i64,
    pub descendants: i64,
    /// Unix seconds the item was submitted
    pub submission_time: i64,
    /// Unix seconds this observation was taken
    pub sample_time: i64,
    /// One slot per configured category, in configuration order; `None`
    /// when the item is not ranked in that category this tick
    pub ranks: Vec<Option<u32>>,
    /// Tick number, snapshot mode only
    pub tick: Option<u64>,
}

impl Sample {
    /// Assemble an observation from a fetched item and this tick's rank maps
    pub fn assemble(
        item: &ApiItem,
        categories: &[String],
        rank_maps: &HashMap<String, RankMap>,
        sample_time: i64,
        tick: Option<u64>,
    ) -> Self {
        let ranks = categories
            .iter()
            .map(|category| rank_maps.get(category).and_then(|map| map.rank_of(item.id)))
            .collect();

        Self {
            id: item.id,
            score: item.score,
            descendants: item.descendants,
            submission_time: item.time,
            sample_time,
            ranks,
            tick,
        }
    }
}

/// Fan out detail fetches over the working set with bounded concurrency
///
/// Yields per-item outcomes in completion order, not submission order. The
/// caller decides what a failure means; this layer only guarantees that it
/// stays confined to its item.
pub fn detail_stream(
    api: Arc<dyn SourceApi>,
    ids: Vec<ItemId>,
    max_in_flight: usize,
) -> impl Stream<Item = Result<(ItemId, ApiItem), ItemSampleError>> {
    stream::iter(ids.into_iter().map(move |id| {
        let api = Arc::clone(&api);
        async move {
            match api.item(id).await {
                Ok(item) => Ok((id, item)),
                Err(source) => Err(ItemSampleError { id, source }),
            }
        }
    }))
    .buffer_unordered(max_in_flight.max(1))
}
