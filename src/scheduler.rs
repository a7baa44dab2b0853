//! Round scheduling - the tick-driven sampling pipeline
//!
//! One round per timer fire:
//! 1. Fetch every category list concurrently and aggregate ranks
//! 2. Settle the working set (admit discoveries, evict aged-out items)
//! 3. Fan out detail fetches with bounded concurrency
//! 4. Append one row per completed sample
//!
//! Rounds are serialized: the round body is awaited inside the timer loop,
//! and timer fires that land while a round is still running are skipped.
//! An aggregation failure abandons the round with the watchlist untouched.
//! No failure here ever terminates the process.

use crate::api::SourceApi;
use crate::config::{Config, Mode};
use crate::ranks;
use crate::sampler::{self, Sample};
use crate::sink::TsvSink;
use crate::watchlist::Watchlist;
use futures::stream::StreamExt;
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub struct Scheduler<W: Write> {
    api: Arc<dyn SourceApi>,
    config: Config,
    sink: TsvSink<W>,
    watchlist: Watchlist,
    tick: u64,

    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl<W: Write> Scheduler<W> {
    /// Create a scheduler reading the system clock
    pub fn new(api: Arc<dyn SourceApi>, config: Config, sink: TsvSink<W>) -> Self {
        Self::new_with_timestamp_fn(api, config, sink, Box::new(|| chrono::Utc::now().timestamp()))
    }

    /// Create a scheduler with a custom timestamp function
    ///
    /// Used for testing with deterministic timestamps.
    pub fn new_with_timestamp_fn(
        api: Arc<dyn SourceApi>,
        config: Config,
        sink: TsvSink<W>,
        now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
    ) -> Self {
        Self {
            api,
            config,
            sink,
            watchlist: Watchlist::new(),
            tick: 0,
            now_fn,
        }
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn ticks_completed(&self) -> u64 {
        self.tick
    }

    pub fn into_sink(self) -> TsvSink<W> {
        self.sink
    }

    /// Run rounds forever at the configured interval
    ///
    /// The first round fires immediately at startup. Runs until the task is
    /// dropped (main races this against CTRL+C).
    pub async fn run(&mut self) {
        let mut timer = interval(Duration::from_secs(self.config.sample_interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            self.run_round().await;
        }
    }

    /// Execute one full sampling round
    pub async fn run_round(&mut self) {
        let tick = self.tick;
        self.tick += 1;
        let round_start = Instant::now();

        // Discovery mode needs the discovery list in the same concurrent
        // batch, whether or not it also contributes a rank column
        let mut fetch_categories = self.config.categories.clone();
        if self.config.mode == Mode::Discovery
            && !fetch_categories.contains(&self.config.discovery_category)
        {
            fetch_categories.push(self.config.discovery_category.clone());
        }

        let rank_maps =
            match ranks::aggregate(self.api.as_ref(), &fetch_categories, self.config.max_rank)
                .await
            {
                Ok(maps) => maps,
                Err(e) => {
                    log::error!("❌ tick {}: skipping round, {}", tick, e);
                    return;
                }
            };

        let ids = match self.config.mode {
            Mode::Discovery => {
                if let Some(discovered) = rank_maps.get(&self.config.discovery_category) {
                    let added = self.watchlist.admit_discovered(discovered.ids(), tick);
                    if added > 0 {
                        log::debug!("tick {}: admitted {} newly discovered items", tick, added);
                    }
                }

                let now = (self.now_fn)();
                let evicted = self.watchlist.evict_aged(now, self.config.max_age_secs());
                if !evicted.is_empty() {
                    log::debug!(
                        "tick {}: evicted {} aged-out items before fetch",
                        tick,
                        evicted.len()
                    );
                }

                self.watchlist.ids()
            }
            Mode::Snapshot => {
                // Tick-local working set: every item ranked anywhere this tick
                let mut seen = HashSet::new();
                for category in &self.config.categories {
                    if let Some(map) = rank_maps.get(category) {
                        seen.extend(map.ids());
                    }
                }
                seen.into_iter().collect()
            }
        };

        let tick_tag = (self.config.mode == Mode::Snapshot).then_some(tick);
        let mut detail = sampler::detail_stream(
            Arc::clone(&self.api),
            ids,
            self.config.max_concurrent_fetches,
        );

        let mut emitted = 0usize;
        while let Some(outcome) = detail.next().await {
            match outcome {
                Ok((id, item)) => {
                    let sample_time = (self.now_fn)();

                    if self.config.mode == Mode::Discovery {
                        self.watchlist.record_submission_time(id, item.time);
                        if sample_time - item.time > self.config.max_age_secs() {
                            self.watchlist.evict(id);
                            log::debug!("tick {}: item {} aged out, dropping sample", tick, id);
                            continue;
                        }
                    }

                    if sample_time < item.time {
                        log::warn!(
                            "⚠️  tick {}: item {} submission time {} is ahead of sample time {}",
                            tick,
                            id,
                            item.time,
                            sample_time
                        );
                    }

                    let sample = Sample::assemble(
                        &item,
                        &self.config.categories,
                        &rank_maps,
                        sample_time,
                        tick_tag,
                    );
                    match self.sink.write(&sample) {
                        Ok(()) => emitted += 1,
                        Err(e) => {
                            log::error!(
                                "❌ tick {}: failed to write sample for item {}: {}",
                                tick,
                                id,
                                e
                            );
                        }
                    }
                }
                Err(e) => {
                    log::warn!("⚠️  tick {}: {}", tick, e);
                }
            }
        }

        log::info!(
            "📊 tick {}: updated {} stories in {}ms",
            tick,
            emitted,
            round_start.elapsed().as_millis()
        );
    }
}
