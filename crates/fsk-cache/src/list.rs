//! Cache manager for flat, identity-keyed feeds (timelines, notification
//! lists).
//!
//! # Splice rules
//!
//! | location           | effect                                        |
//! |--------------------|-----------------------------------------------|
//! | `Start`            | page prepended                                |
//! | `End`              | page appended                                 |
//! | `Replace`          | cached list becomes the page (may be empty)   |
//! | `InsertAfter(id)`  | page placed right above the item `id`         |
//! | `InsertBefore(id)` | page placed right below the item `id`         |
//!
//! The list is newest first, so "after" (newer than the anchor) is above it
//! and "before" (older) is below it. A missing anchor degrades to prepend
//! (after) or append (before).

use std::sync::Arc;

use async_trait::async_trait;
use fsk_marker::{MarkerPosition, ReadMarker};
use fsk_schemas::{FeedKind, InsertLocation, PublishedItem};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CacheError, CacheManager, CacheableFeed, SnapshotStore};

/// One page (or the merged list) of a flat feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> CacheableFeed for FeedPage<T> {
    fn has_results(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct ListSnapshot<T> {
    items: Vec<T>,
    marker: ReadMarker,
}

/// [`CacheManager`] over a `Vec<T>`, keyed by the item's string identity.
pub struct ListCache<T> {
    kind: FeedKind,
    current: Option<FeedPage<T>>,
    last_fetched: Option<FeedPage<T>>,
    marker: ReadMarker,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl<T> ListCache<T>
where
    T: PublishedItem<Id = String>,
{
    pub fn new(user_identity: impl Into<String>, kind: FeedKind) -> Self {
        Self {
            kind,
            current: None,
            last_fetched: None,
            marker: ReadMarker::empty(user_identity),
            store: None,
        }
    }

    /// Persist through `store` on commit / restore / clear.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Start from a known marker (e.g. loaded by the account layer).
    pub fn with_marker(mut self, marker: ReadMarker) -> Self {
        self.marker = marker;
        self
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn read_marker(&self) -> &ReadMarker {
        &self.marker
    }

    /// Cached items in feed order (newest first).
    pub fn items(&self) -> &[T] {
        self.current
            .as_ref()
            .map(|p| p.items.as_slice())
            .unwrap_or(&[])
    }

    fn snapshot_key(&self) -> String {
        format!("{}/{}", self.marker.user_identity(), self.kind)
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.items().iter().position(|item| item.identity() == id)
    }

    fn splice(&self, page: &FeedPage<T>, at: &InsertLocation) -> Vec<T> {
        let existing = self.items();
        match at {
            InsertLocation::Replace => page.items.clone(),
            InsertLocation::Start => {
                let mut out = page.items.clone();
                out.extend_from_slice(existing);
                out
            }
            InsertLocation::End => {
                let mut out = existing.to_vec();
                out.extend_from_slice(&page.items);
                out
            }
            InsertLocation::InsertAfter(id) => {
                let idx = match self.position_of(id) {
                    Some(i) => i,
                    None => {
                        warn!(kind = %self.kind, anchor = %id, "insert-after anchor missing; prepending");
                        0
                    }
                };
                splice_at(existing, idx, &page.items)
            }
            InsertLocation::InsertBefore(id) => {
                let idx = match self.position_of(id) {
                    Some(i) => i + 1,
                    None => {
                        warn!(kind = %self.kind, anchor = %id, "insert-before anchor missing; appending");
                        existing.len()
                    }
                };
                splice_at(existing, idx, &page.items)
            }
        }
    }
}

fn splice_at<T: Clone>(existing: &[T], idx: usize, page: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(existing.len() + page.len());
    out.extend_from_slice(&existing[..idx]);
    out.extend_from_slice(page);
    out.extend_from_slice(&existing[idx..]);
    out
}

#[async_trait]
impl<T> CacheManager for ListCache<T>
where
    T: PublishedItem<Id = String> + Serialize + DeserializeOwned,
{
    type Cached = FeedPage<T>;

    fn current_results(&self) -> Option<&FeedPage<T>> {
        self.current.as_ref()
    }

    fn most_recently_fetched_results(&self) -> Option<&FeedPage<T>> {
        self.last_fetched.as_ref()
    }

    fn current_read_marker(&self) -> Option<MarkerPosition> {
        self.marker.last_read(self.kind).cloned()
    }

    fn update_by_inserting(&mut self, page: FeedPage<T>, at: &InsertLocation) {
        let merged = self.splice(&page, at);
        debug!(
            kind = %self.kind,
            page = page.len(),
            total = merged.len(),
            at = ?at,
            "cache updated"
        );
        self.current = Some(FeedPage::new(merged));
        self.last_fetched = Some(page);
    }

    fn update_to_newer_marker(&mut self, position: MarkerPosition, enforce_forward_progress: bool) {
        self.marker = self
            .marker
            .by_setting_position(position, self.kind, enforce_forward_progress);
    }

    async fn restore_from_cache(&mut self) -> Result<(), CacheError> {
        let Some(store) = self.store.clone() else {
            return Ok(());
        };
        let Some(bytes) = store.load(&self.snapshot_key()).await? else {
            return Ok(());
        };
        let snap: ListSnapshot<T> = serde_json::from_slice(&bytes)?;
        if self.current.is_none() {
            self.current = Some(FeedPage::new(snap.items));
        }
        self.marker = self.marker.merged_with(&snap.marker);
        Ok(())
    }

    async fn commit_to_cache(&self) -> Result<(), CacheError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };
        let snap = ListSnapshot {
            items: self.items().to_vec(),
            marker: self.marker.clone(),
        };
        let bytes = serde_json::to_vec(&snap)?;
        store.save(&self.snapshot_key(), bytes).await
    }

    async fn clear_cache(&mut self) -> Result<(), CacheError> {
        self.current = None;
        self.last_fetched = None;
        match self.store.as_ref() {
            Some(store) => store.remove(&self.snapshot_key()).await,
            None => Ok(()),
        }
    }
}
