//! Scenario: "Can Load Older" Flag Through the Full Loader
//!
//! # Invariants under test
//! - After a reload, the flag is true iff the filtered result has more than
//!   the reload threshold (20 by default) items: 25 → true, 15 → false.
//! - An empty page appended at the end of the feed leaves the cache and the
//!   published items untouched and forces the flag to false.
//! - A later reload or newer-page load can turn the flag back on.
//! - Duplicates produced by overlapping pages never reach observers.

use fsk_cache::{CacheManager, FeedPage, ListCache};
use fsk_config::LoaderConfig;
use fsk_loader::FeedLoader;
use fsk_schemas::{FeedKind, FeedLoadRequest};
use fsk_testkit::{ids, list_loader, posts, Post, ScriptedLoader, ScriptedSource};

fn loader_with(source: ScriptedSource) -> ScriptedLoader {
    list_loader(ListCache::new("alice", FeedKind::Home), source)
}

async fn load(loader: &ScriptedLoader, request: FeedLoadRequest) {
    loader.request_load(request).await;
    loader.wait_idle().await;
}

#[tokio::test]
async fn reload_of_25_items_can_load_older() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home).respond(FeedLoadRequest::Reload, posts(1, 25)),
    );
    load(&loader, FeedLoadRequest::Reload).await;
    assert_eq!(loader.records().len(), 25);
    assert!(loader.records().can_load_older);
}

#[tokio::test]
async fn reload_of_15_items_cannot_load_older() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home).respond(FeedLoadRequest::Reload, posts(1, 15)),
    );
    load(&loader, FeedLoadRequest::Reload).await;
    assert_eq!(loader.records().len(), 15);
    assert!(!loader.records().can_load_older);
}

#[tokio::test]
async fn threshold_counts_filtered_items() {
    let source = ScriptedSource::new(FeedKind::Home).respond(FeedLoadRequest::Reload, posts(1, 25));
    // Mutes 1, 2 and 10..=25, leaving posts 3..=9.
    source.set_muted(["post 1", "post 2"]);
    let loader = loader_with(source);
    load(&loader, FeedLoadRequest::Reload).await;
    assert_eq!(loader.records().len(), 7);
    assert!(!loader.records().can_load_older);
}

#[tokio::test]
async fn threshold_is_configurable() {
    let source = ScriptedSource::new(FeedKind::Home).respond(FeedLoadRequest::Reload, posts(1, 15));
    let config = LoaderConfig {
        reload_more_threshold: 10,
        ..LoaderConfig::default()
    };
    let loader = FeedLoader::new(ListCache::new("alice", FeedKind::Home), source, config);
    loader.request_load(FeedLoadRequest::Reload).await;
    loader.wait_idle().await;
    assert!(loader.records().can_load_older);
}

#[tokio::test]
async fn end_of_feed_then_reload_restores_flag() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home)
            .respond(FeedLoadRequest::Reload, posts(11, 40))
            .respond(FeedLoadRequest::Older, posts(1, 10))
            .respond(FeedLoadRequest::Older, FeedPage::empty())
            .respond(FeedLoadRequest::Reload, posts(11, 40)),
    );

    load(&loader, FeedLoadRequest::Reload).await;
    assert!(loader.records().can_load_older);

    load(&loader, FeedLoadRequest::Older).await;
    assert_eq!(loader.records().len(), 40);
    assert!(loader.records().can_load_older);

    load(&loader, FeedLoadRequest::Older).await;
    let after_end = loader.records();
    assert_eq!(after_end.len(), 40);
    assert!(!after_end.can_load_older);

    load(&loader, FeedLoadRequest::Reload).await;
    assert_eq!(loader.records().len(), 30);
    assert!(loader.records().can_load_older);
}

#[tokio::test]
async fn empty_end_page_does_not_touch_cache() {
    let source = ScriptedSource::new(FeedKind::Home)
        .respond(FeedLoadRequest::Reload, posts(1, 5))
        .respond(FeedLoadRequest::Older, FeedPage::empty());
    let loader = loader_with(source);

    load(&loader, FeedLoadRequest::Reload).await;
    load(&loader, FeedLoadRequest::Older).await;

    // The last page folded into the cache is still the reload page.
    let snapshot = loader.records();
    assert_eq!(ids(&snapshot.items), vec!["5", "4", "3", "2", "1"]);
    assert!(!snapshot.can_load_older);
}

#[tokio::test]
async fn newer_page_after_empty_feed_turns_flag_on() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home)
            .respond(FeedLoadRequest::Reload, FeedPage::empty())
            .respond(FeedLoadRequest::Older, FeedPage::empty())
            .respond(FeedLoadRequest::Newer, posts(1, 3)),
    );

    load(&loader, FeedLoadRequest::Reload).await;
    assert!(!loader.records().can_load_older);
    load(&loader, FeedLoadRequest::Older).await;
    assert!(!loader.records().can_load_older);

    load(&loader, FeedLoadRequest::Newer).await;
    assert_eq!(ids(&loader.records().items), vec!["3", "2", "1"]);
    assert!(loader.records().can_load_older);
}

#[tokio::test]
async fn overlapping_pages_are_deduplicated_in_order() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home)
            .respond(FeedLoadRequest::Reload, posts(1, 5))
            .respond(FeedLoadRequest::Newer, posts(4, 7)),
    );

    load(&loader, FeedLoadRequest::Reload).await;
    load(&loader, FeedLoadRequest::Newer).await;

    assert_eq!(
        ids(&loader.records().items),
        vec!["7", "6", "5", "4", "3", "2", "1"]
    );
}

#[tokio::test]
async fn anchored_insert_keeps_previous_flag() {
    let loader = loader_with(
        ScriptedSource::new(FeedKind::Home)
            .respond(FeedLoadRequest::Reload, posts(20, 45))
            .respond(FeedLoadRequest::OlderThan("20".into()), posts(10, 12)),
    );

    load(&loader, FeedLoadRequest::Reload).await;
    assert!(loader.records().can_load_older);

    // Items older than "20" go in right below it (InsertBefore).
    load(&loader, FeedLoadRequest::OlderThan("20".into())).await;
    let snapshot = loader.records();
    assert!(snapshot.can_load_older);
    assert_eq!(
        ids(&snapshot.items[snapshot.len() - 4..]),
        vec!["20", "12", "11", "10"]
    );
}

#[test]
fn list_page_without_results_is_not_cacheable_content() {
    use fsk_cache::CacheableFeed;
    assert!(!FeedPage::<Post>::empty().has_results());
    let mut cache = ListCache::<Post>::new("alice", FeedKind::Home);
    assert!(cache.current_results().is_none());
    cache.update_by_inserting(posts(1, 1), &fsk_schemas::InsertLocation::Replace);
    assert!(cache.current_results().is_some_and(CacheableFeed::has_results));
}
