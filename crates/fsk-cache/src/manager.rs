use async_trait::async_trait;
use fsk_marker::MarkerPosition;
use fsk_schemas::InsertLocation;

use crate::CacheError;

/// A cached (or freshly fetched) feed payload.
pub trait CacheableFeed: Clone + Send + Sync + 'static {
    /// `false` for an empty page. Empty pages at `Start`, `End` and the
    /// insert-before/after points never reach the cache.
    fn has_results(&self) -> bool;
}

/// Owner of a feed's authoritative merged payload and read position.
///
/// Implemented once per concrete feed; the loader only depends on this
/// contract. All synchronous methods run inside the loader's serialization
/// domain, so a mutation followed by a read-back is atomic with respect to
/// other loader operations.
#[async_trait]
pub trait CacheManager: Send + Sync + 'static {
    type Cached: CacheableFeed;

    /// The fully merged payload, or `None` before anything was cached.
    fn current_results(&self) -> Option<&Self::Cached>;

    /// The page most recently folded in.
    fn most_recently_fetched_results(&self) -> Option<&Self::Cached>;

    /// Effective read position for this feed, if any.
    fn current_read_marker(&self) -> Option<MarkerPosition>;

    /// Splice `page` into the cached payload at `at`.
    fn update_by_inserting(&mut self, page: Self::Cached, at: &InsertLocation);

    /// Store a new read position for this feed.
    fn update_to_newer_marker(&mut self, position: MarkerPosition, enforce_forward_progress: bool);

    /// Load a previously committed snapshot, if one exists.
    async fn restore_from_cache(&mut self) -> Result<(), CacheError>;

    /// Persist the current payload and marker.
    async fn commit_to_cache(&self) -> Result<(), CacheError>;

    /// Drop the in-memory payload and any persisted snapshot.
    async fn clear_cache(&mut self) -> Result<(), CacheError>;
}
