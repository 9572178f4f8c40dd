//! fsk-cache
//!
//! Capability boundary between the feed loader and a feed's cached state.
//!
//! The loader never touches a cached payload directly: it folds pages in
//! through [`CacheManager::update_by_inserting`] and reads the merged result
//! back. A concrete feed supplies the splice logic; [`ListCache`] is the
//! ready-made manager for feeds that are a flat, identity-keyed list.

mod error;
mod list;
mod manager;
mod store;

pub use error::CacheError;
pub use list::{FeedPage, ListCache};
pub use manager::{CacheManager, CacheableFeed};
pub use store::{MemorySnapshotStore, SnapshotStore};
