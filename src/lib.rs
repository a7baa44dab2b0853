//! rankflow - periodic sampler of ranked-item feeds
//!
//! Polls a read-only ranked-list API on a fixed interval, tracks a working
//! set of items, fetches per-item detail with bounded concurrency, and
//! appends one tab-separated observation row per item per tick. See the
//! `scheduler` module for the round pipeline.

pub mod api;
pub mod config;
pub mod error;
pub mod ranks;
pub mod sampler;
pub mod scheduler;
pub mod sink;
pub mod watchlist;
