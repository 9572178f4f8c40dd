//! fsk-loader
//!
//! Single-flight feed loading: a FIFO backlog of [`FeedLoadRequest`]s, at
//! most one fetch in flight, and a merge-and-publish pipeline that folds each
//! page into the feed's [`CacheManager`] and republishes a deduplicated
//! snapshot.
//!
//! - [`RequestScheduler`]: backlog + Idle/Busy gate (pure, synchronous)
//! - [`publish`]: stable dedup + "can load older" fallback heuristic
//! - [`pipeline`]: cache update gate, splice, filter projection, flag rules
//! - [`FeedLoader`]: the façade callers use
//!
//! [`FeedLoadRequest`]: fsk_schemas::FeedLoadRequest
//! [`CacheManager`]: fsk_cache::CacheManager

mod error;
mod loader;
pub mod pipeline;
pub mod publish;
mod scheduler;
mod source;

pub use error::{FetchError, LoadError};
pub use loader::FeedLoader;
pub use scheduler::{RequestScheduler, SchedulerState};
pub use source::FeedSource;
