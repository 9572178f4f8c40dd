//! Scenario: First-Load Bootstrap
//!
//! # Invariants under test
//! - `do_first_load` publishes the cached feed before any network fetch
//!   completes.
//! - A server-confirmed read marker is applied with forward progress: it
//!   never regresses a newer restored marker.
//! - Cache and server-marker failures are non-fatal; the reload is queued
//!   regardless and its result replaces the restored snapshot.

use std::sync::Arc;

use chrono::Utc;
use fsk_cache::{CacheManager, ListCache, MemorySnapshotStore, SnapshotStore};
use fsk_loader::FetchError;
use fsk_marker::MarkerPosition;
use fsk_schemas::{FeedKind, FeedLoadRequest, InsertLocation};
use fsk_testkit::{ids, list_loader, posts, FailingStore, Post, ScriptedSource};

async fn seeded_store(marker: Option<&str>) -> Arc<dyn SnapshotStore> {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let mut cache = ListCache::<Post>::new("alice", FeedKind::Home).with_store(Arc::clone(&store));
    cache.update_by_inserting(posts(1, 5), &InsertLocation::Replace);
    if let Some(id) = marker {
        cache.update_to_newer_marker(MarkerPosition::local(id), true);
    }
    cache.commit_to_cache().await.unwrap();
    store
}

#[tokio::test]
async fn cached_feed_is_published_before_reload_completes() {
    let store = seeded_store(None).await;
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home).with_store(store),
        ScriptedSource::new(FeedKind::Home)
            .gated()
            .respond(FeedLoadRequest::Reload, posts(4, 8)),
    );

    loader.do_first_load().await;

    // The reload is parked on the gate; observers already see the cache.
    assert!(loader.source().wait_for_calls(1).await);
    assert!(loader.is_loading());
    assert_eq!(ids(&loader.records().items), vec!["5", "4", "3", "2", "1"]);

    loader.source().release(1);
    loader.wait_idle().await;

    assert_eq!(loader.source().calls(), vec![FeedLoadRequest::Reload]);
    assert_eq!(ids(&loader.records().items), vec!["8", "7", "6", "5", "4"]);
}

#[tokio::test]
async fn server_marker_is_applied_during_bootstrap() {
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home),
        ScriptedSource::new(FeedKind::Home)
            .with_server_marker(Ok(Some(MarkerPosition::server("3", Utc::now())))),
    );

    assert!(!loader.is_unread("4").await);
    loader.do_first_load().await;
    loader.wait_idle().await;

    let marker = loader.read_marker().await.unwrap();
    assert!(marker.is_server_confirmed());
    assert_eq!(marker.last_read_id(), "3");
    assert!(loader.is_unread("4").await);
    assert!(!loader.is_unread("3").await);
}

#[tokio::test]
async fn stale_server_marker_never_regresses_restored_marker() {
    let store = seeded_store(Some("4")).await;
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home).with_store(store),
        ScriptedSource::new(FeedKind::Home)
            .with_server_marker(Ok(Some(MarkerPosition::server("2", Utc::now())))),
    );

    loader.do_first_load().await;
    loader.wait_idle().await;

    let marker = loader.read_marker().await.unwrap();
    assert_eq!(marker.last_read_id(), "4");
    assert!(!marker.is_server_confirmed());
}

#[tokio::test]
async fn bootstrap_failures_are_not_fatal() {
    let store: Arc<dyn SnapshotStore> = Arc::new(FailingStore);
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home).with_store(store),
        ScriptedSource::new(FeedKind::Home)
            .with_server_marker(Err(FetchError::Transport("offline".into())))
            .respond(FeedLoadRequest::Reload, posts(1, 3)),
    );

    loader.do_first_load().await;
    loader.wait_idle().await;

    assert_eq!(loader.source().calls(), vec![FeedLoadRequest::Reload]);
    assert_eq!(ids(&loader.records().items), vec!["3", "2", "1"]);
    assert_eq!(loader.current_error(), None);
    assert_eq!(loader.read_marker().await, None);
}

#[tokio::test]
async fn commit_and_clear_go_through_the_store() {
    let store = Arc::new(MemorySnapshotStore::new());
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home).with_store(store.clone()),
        ScriptedSource::new(FeedKind::Home).respond(FeedLoadRequest::Reload, posts(1, 3)),
    );

    loader.request_load(FeedLoadRequest::Reload).await;
    loader.wait_idle().await;
    loader.mark_as_read("2").await;
    loader.commit_to_cache().await.unwrap();
    assert!(store.contains("alice/home").await);

    loader.clear_cache().await.unwrap();
    assert!(!store.contains("alice/home").await);
    assert!(loader.records().is_empty());
}

#[tokio::test]
async fn commit_failure_is_returned_to_the_caller() {
    let loader = list_loader(
        ListCache::new("alice", FeedKind::Home).with_store(Arc::new(FailingStore)),
        ScriptedSource::new(FeedKind::Home),
    );
    assert!(loader.commit_to_cache().await.is_err());
    assert_eq!(loader.current_error(), None);
}
