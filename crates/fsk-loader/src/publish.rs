//! Deduplication and the final publish step.

use std::collections::HashSet;

use fsk_schemas::{PublishedItem, PublishedResult};
use tracing::debug;

/// Keep the first occurrence of each identity, preserving order.
pub fn dedup_by_identity<T: PublishedItem>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.identity()))
        .collect()
}

/// Fallback for "can load older" when the caller supplied no explicit value.
///
/// Only a guess: the authoritative "no more" signal is an empty page
/// appended at the end of the feed.
pub fn infer_can_load_older<T: PublishedItem>(
    previous: &[T],
    next: &[T],
    compare_last_identity: bool,
) -> bool {
    match (previous.last(), next.last()) {
        (Some(old), Some(new)) => {
            !compare_last_identity || old.identity() != new.identity()
        }
        (None, None) => false,
        _ => true,
    }
}

/// Build the next published snapshot from a filtered candidate sequence.
///
/// `hint` wins when present; otherwise [`infer_can_load_older`] decides
/// against `previous`.
pub fn publish<T: PublishedItem>(
    previous: &PublishedResult<T>,
    candidate: Vec<T>,
    hint: Option<bool>,
    compare_last_identity: bool,
) -> PublishedResult<T> {
    let before = candidate.len();
    let items = dedup_by_identity(candidate);
    let can_load_older = hint.unwrap_or_else(|| {
        infer_can_load_older(&previous.items, &items, compare_last_identity)
    });
    debug!(
        items = items.len(),
        dropped = before - items.len(),
        can_load_older,
        hinted = hint.is_some(),
        "publishing result"
    );
    PublishedResult {
        items,
        can_load_older,
    }
}
