//! Merge-and-publish: fold one fetched page into the cache and derive the
//! next published snapshot.
//!
//! | location                 | empty page                         | non-empty page         | next `can_load_older`        |
//! |--------------------------|------------------------------------|------------------------|------------------------------|
//! | `Start`                  | cache untouched                    | cache updated          | heuristic                    |
//! | `End`                    | cache untouched, flag forced false | cache updated          | heuristic                    |
//! | `InsertAfter/Before(id)` | cache untouched                    | cache updated          | previous value               |
//! | `Replace`                | cache cleared                      | cache replaced         | `len > reload_more_threshold`|
//!
//! Everything here is synchronous; the caller holds the loader lock for the
//! whole call, so the cache mutation and read-back are atomic with respect
//! to other loader operations.

use fsk_cache::{CacheManager, CacheableFeed};
use fsk_config::LoaderConfig;
use fsk_schemas::{InsertLocation, PublishedItem, PublishedResult};
use tracing::{debug, info};

use crate::publish::publish;

/// Whether a page at `at` should be folded into the cache.
pub fn should_apply<P: CacheableFeed>(page: &P, at: &InsertLocation) -> bool {
    matches!(at, InsertLocation::Replace) || page.has_results()
}

/// Explicit "can load older" value for `at`, or `None` to fall back to the
/// publish heuristic.
pub fn can_load_older_hint<T>(
    at: &InsertLocation,
    previous: &PublishedResult<T>,
    filtered_len: usize,
    config: &LoaderConfig,
) -> Option<bool> {
    match at {
        InsertLocation::Start | InsertLocation::End => None,
        InsertLocation::InsertAfter(_) | InsertLocation::InsertBefore(_) => {
            Some(previous.can_load_older)
        }
        InsertLocation::Replace => Some(filtered_len > config.reload_more_threshold),
    }
}

/// Fold `page` into `cache` at `at` and return the snapshot to publish.
///
/// `filtered_view` is the feed's filter projection; it runs on the cache's
/// merged payload, or on `page` itself if the cache still reports nothing.
pub fn update_after_inserting<C, T, F>(
    cache: &mut C,
    page: C::Cached,
    at: &InsertLocation,
    previous: &PublishedResult<T>,
    config: &LoaderConfig,
    filtered_view: F,
) -> PublishedResult<T>
where
    C: CacheManager,
    T: PublishedItem,
    F: FnOnce(&C::Cached) -> Vec<T>,
{
    if matches!(at, InsertLocation::End) && !page.has_results() {
        info!("empty page at end of feed; no older items remain");
        return PublishedResult {
            items: previous.items.clone(),
            can_load_older: false,
        };
    }

    if should_apply(&page, at) {
        cache.update_by_inserting(page.clone(), at);
    } else {
        debug!(at = ?at, "empty page; cache left untouched");
    }

    let filtered = filtered_view(cache.current_results().unwrap_or(&page));
    let hint = can_load_older_hint(at, previous, filtered.len(), config);
    publish(previous, filtered, hint, config.compare_last_identity)
}

/// Re-derive the snapshot from the cache without fetching, e.g. after the
/// filter settings changed. Returns `None` when nothing is cached yet.
pub fn refilter<C, T, F>(
    cache: &C,
    previous: &PublishedResult<T>,
    config: &LoaderConfig,
    filtered_view: F,
) -> Option<PublishedResult<T>>
where
    C: CacheManager,
    T: PublishedItem,
    F: FnOnce(&C::Cached) -> Vec<T>,
{
    let current = cache.current_results()?;
    let filtered = filtered_view(current);
    Some(publish(
        previous,
        filtered,
        Some(previous.can_load_older),
        config.compare_last_identity,
    ))
}
