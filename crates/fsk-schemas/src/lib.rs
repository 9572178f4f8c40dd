//! fsk-schemas
//!
//! Shared vocabulary for the feed synchronization engine:
//! - item ID ordering (snowflake-style string IDs, never parsed as integers)
//! - feed kinds, load requests and their insertion points
//! - the published result observers receive
//!
//! Pure types. No IO, no async.

mod ids;
mod request;
mod result;

pub use ids::{compare_ids, is_newer, is_older};
pub use request::{FeedKind, FeedLoadRequest, InsertLocation};
pub use result::{PublishedItem, PublishedResult};
