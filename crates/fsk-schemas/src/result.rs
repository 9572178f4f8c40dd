use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A display-ready item produced by a feed's filter projection.
///
/// `identity` must be stable across loads: the publish step deduplicates on
/// it and the "can load older" heuristic compares it.
pub trait PublishedItem: Clone + Send + Sync + 'static {
    type Id: Clone + Debug + Eq + Hash + Send + Sync + 'static;

    fn identity(&self) -> Self::Id;
}

/// The snapshot observers see after every successful load or re-filter.
///
/// Always replaced wholesale, never patched. `items` holds no two entries
/// with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedResult<T> {
    pub items: Vec<T>,
    pub can_load_older: bool,
}

impl<T> PublishedResult<T> {
    /// Nothing loaded yet. `can_load_older` starts false so no loading
    /// indicator shows before the first page arrives.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            can_load_older: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for PublishedResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: PublishedItem> PublishedResult<T> {
    /// Identities in published order.
    pub fn identities(&self) -> Vec<T::Id> {
        self.items.iter().map(PublishedItem::identity).collect()
    }

    /// Identity of the oldest published item, if any.
    pub fn last_identity(&self) -> Option<T::Id> {
        self.items.last().map(PublishedItem::identity)
    }
}
