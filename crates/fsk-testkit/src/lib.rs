//! fsk-testkit
//!
//! Deterministic fakes for exercising a [`FeedLoader`] end to end without a
//! network: a scripted fetch collaborator, a snapshot store that always
//! fails, and post fixtures. No randomness, no I/O.

mod scripted;

use async_trait::async_trait;
use fsk_cache::{CacheError, FeedPage, ListCache, SnapshotStore};
use fsk_config::LoaderConfig;
use fsk_loader::FeedLoader;
use fsk_schemas::PublishedItem;
use serde::{Deserialize, Serialize};

pub use scripted::ScriptedSource;

/// Loader over a list-shaped cache fed by a [`ScriptedSource`].
pub type ScriptedLoader = FeedLoader<ListCache<Post>, ScriptedSource>;

/// Minimal timeline entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl PublishedItem for Post {
    type Id = String;

    fn identity(&self) -> String {
        self.id.clone()
    }
}

pub fn post(id: impl Into<String>) -> Post {
    let id = id.into();
    Post {
        text: format!("post {id}"),
        id,
    }
}

pub fn post_with_text(id: impl Into<String>, text: impl Into<String>) -> Post {
    Post {
        id: id.into(),
        text: text.into(),
    }
}

/// A page in the given order.
pub fn page(ids: &[&str]) -> FeedPage<Post> {
    FeedPage::new(ids.iter().map(|id| post(*id)).collect())
}

/// Posts `lo..=hi`, newest first (feed order).
pub fn posts(lo: u64, hi: u64) -> FeedPage<Post> {
    FeedPage::new((lo..=hi).rev().map(|n| post(n.to_string())).collect())
}

/// Identities in published order; handy for assertions.
pub fn ids(items: &[Post]) -> Vec<String> {
    items.iter().map(PublishedItem::identity).collect()
}

pub fn list_loader(cache: ListCache<Post>, source: ScriptedSource) -> ScriptedLoader {
    FeedLoader::new(cache, source, LoaderConfig::default())
}

/// Store whose every operation fails, for best-effort paths.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Store("store unavailable".into()))
    }

    async fn save(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), CacheError> {
        Err(CacheError::Store("store unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Store("store unavailable".into()))
    }
}
