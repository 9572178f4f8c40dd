use async_trait::async_trait;
use fsk_cache::CacheableFeed;
use fsk_marker::MarkerPosition;
use fsk_schemas::{FeedKind, FeedLoadRequest, PublishedItem};

use crate::FetchError;

/// Per-feed collaborators: how to fetch a page, how to project the cached
/// payload into display items, and (optionally) where the server keeps the
/// read marker.
///
/// `fetch` and `filtered_view` are required, so a feed that forgets either
/// does not compile.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    type Cached: CacheableFeed;
    type Item: PublishedItem;

    fn kind(&self) -> FeedKind;

    /// Retrieve one page for `request`. Timeouts are the implementation's
    /// concern; the loader waits for completion or failure.
    async fn fetch(&self, request: &FeedLoadRequest) -> Result<Self::Cached, FetchError>;

    /// Filter projection. Must be a pure function of `cached` (and of the
    /// filter settings in force at call time).
    fn filtered_view(&self, cached: &Self::Cached) -> Vec<Self::Item>;

    /// Server-confirmed read position for this feed, fetched once during
    /// bootstrap. Feeds without server markers keep the default.
    async fn fetch_server_marker(&self) -> Result<Option<MarkerPosition>, FetchError> {
        Ok(None)
    }
}
