//! `FeedLoader`: the façade callers use to drive one feed.
//!
//! One tokio `Mutex` is the serialization domain: it guards the scheduler
//! and the cache manager together. Fetches run outside the lock; their
//! completion re-enters it before touching the cache or the published
//! snapshot. Observers read through `watch` channels (last value wins).

use std::sync::Arc;

use fsk_cache::CacheManager;
use fsk_config::LoaderConfig;
use fsk_marker::MarkerPosition;
use fsk_schemas::{FeedKind, FeedLoadRequest, PublishedResult};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::pipeline;
use crate::publish::publish;
use crate::{FeedSource, FetchError, LoadError, RequestScheduler};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct LoaderState<C> {
    scheduler: RequestScheduler,
    cache: C,
}

struct Shared<C, S: FeedSource> {
    state: Mutex<LoaderState<C>>,
    source: S,
    config: LoaderConfig,
    records: watch::Sender<PublishedResult<S::Item>>,
    errors: watch::Sender<Option<LoadError>>,
    loading: watch::Sender<bool>,
}

impl<C, S> Shared<C, S>
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    /// Fold a finished fetch into the cache and publish. Caller holds the
    /// state lock.
    fn complete(
        &self,
        cache: &mut C,
        request: &FeedLoadRequest,
        outcome: Result<C::Cached, FetchError>,
    ) -> Result<(), LoadError> {
        match outcome {
            Ok(page) => {
                let previous = self.records.borrow().clone();
                let next = pipeline::update_after_inserting(
                    cache,
                    page,
                    &request.insert_location(),
                    &previous,
                    &self.config,
                    |cached| self.source.filtered_view(cached),
                );
                debug!(
                    kind = %self.source.kind(),
                    request = %request,
                    items = next.len(),
                    can_load_older = next.can_load_older,
                    "load complete"
                );
                self.records.send_replace(next);
                self.errors.send_if_modified(|current| current.take().is_some());
                Ok(())
            }
            Err(err) => {
                warn!(kind = %self.source.kind(), request = %request, error = %err, "fetch failed");
                let err = LoadError::Fetch(err);
                self.errors.send_replace(Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Release the gate after a load. Returns the next request to run, or
    /// marks the loader idle.
    fn release(&self, state: &mut LoaderState<C>) -> Option<FeedLoadRequest> {
        let next = state.scheduler.release();
        if next.is_none() {
            self.loading.send_replace(false);
        }
        next
    }
}

/// Run one claimed immediate load to completion, then hand any backlog to
/// a [`drive`] task. Runs on its own task so the gate is released even if
/// the caller stops waiting.
async fn run_immediate<C, S>(
    shared: Arc<Shared<C, S>>,
    request: FeedLoadRequest,
) -> Result<(), LoadError>
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    let outcome = shared.source.fetch(&request).await;
    let (result, next) = {
        let mut state = shared.state.lock().await;
        let result = shared.complete(&mut state.cache, &request, outcome);
        (result, shared.release(&mut state))
    };
    if let Some(next) = next {
        tokio::spawn(drive(Arc::clone(&shared), next));
    }
    result
}

/// Run `first`, then keep draining the backlog until the scheduler goes
/// idle.
async fn drive<C, S>(shared: Arc<Shared<C, S>>, first: FeedLoadRequest)
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    let mut next = Some(first);
    while let Some(request) = next {
        let outcome = shared.source.fetch(&request).await;
        let mut state = shared.state.lock().await;
        // Failures are already on the error channel; keep draining.
        let _ = shared.complete(&mut state.cache, &request, outcome);
        next = shared.release(&mut state);
    }
}

// ---------------------------------------------------------------------------
// FeedLoader
// ---------------------------------------------------------------------------

/// Single-flight loader for one feed.
///
/// Cloning yields another handle to the same loader.
pub struct FeedLoader<C, S>
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    shared: Arc<Shared<C, S>>,
}

impl<C, S> Clone for FeedLoader<C, S>
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C, S> FeedLoader<C, S>
where
    C: CacheManager,
    S: FeedSource<Cached = C::Cached>,
{
    pub fn new(cache: C, source: S, config: LoaderConfig) -> Self {
        let (records, _) = watch::channel(PublishedResult::empty());
        let (errors, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(LoaderState {
                    scheduler: RequestScheduler::new(),
                    cache,
                }),
                source,
                config,
                records,
                errors,
                loading,
            }),
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.shared.source.kind()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.shared.config
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    // -- loading ------------------------------------------------------------

    /// Queue `request` (dropped if an equal one is already queued) and start
    /// it right away when nothing is in flight.
    ///
    /// Must be called from within a tokio runtime; the fetch runs on a
    /// spawned task.
    pub async fn request_load(&self, request: FeedLoadRequest) {
        let mut state = self.shared.state.lock().await;
        state.scheduler.enqueue(request);
        if let Some(claimed) = state.scheduler.try_claim_next() {
            self.shared.loading.send_replace(true);
            tokio::spawn(drive(Arc::clone(&self.shared), claimed));
        }
    }

    /// `true` when [`load_immediately`](Self::load_immediately) would get
    /// the gate.
    pub async fn can_load_immediately(&self) -> bool {
        !self.shared.state.lock().await.scheduler.is_busy()
    }

    /// Run `request` now, bypassing the backlog, and resolve when it is
    /// folded in. Meant for pull-to-refresh.
    ///
    /// The fetch runs on a spawned task. Dropping the returned future only
    /// stops waiting: the load still completes, publishes and releases the
    /// gate, and queued requests drain afterwards.
    ///
    /// Callers must check [`can_load_immediately`](Self::can_load_immediately)
    /// first; losing the gate is a programming error (panics in debug
    /// builds, [`LoadError::Busy`] otherwise).
    pub async fn load_immediately(&self, request: FeedLoadRequest) -> Result<(), LoadError> {
        let task = {
            let mut state = self.shared.state.lock().await;
            if !state.scheduler.claim_immediately() {
                debug_assert!(false, "load_immediately called while a load is in flight");
                return Err(LoadError::Busy);
            }
            self.shared.loading.send_replace(true);
            tokio::spawn(run_immediate(Arc::clone(&self.shared), request))
        };

        match task.await {
            Ok(result) => result,
            Err(err) => {
                warn!(kind = %self.kind(), error = %err, "immediate load task failed");
                Err(LoadError::Aborted(err.to_string()))
            }
        }
    }

    /// Bootstrap: show the cached feed, pick up the server read marker, then
    /// queue a reload. The first two steps are best-effort.
    pub async fn do_first_load(&self) {
        {
            let mut state = self.shared.state.lock().await;
            match state.cache.restore_from_cache().await {
                Ok(()) => self.publish_restored(&state.cache),
                Err(err) => {
                    warn!(kind = %self.kind(), error = %err, "cache restore failed; continuing")
                }
            }
        }

        match self.shared.source.fetch_server_marker().await {
            Ok(Some(position)) => {
                info!(
                    kind = %self.kind(),
                    last_read_id = position.last_read_id(),
                    "server read marker fetched"
                );
                let mut state = self.shared.state.lock().await;
                state.cache.update_to_newer_marker(position, true);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(kind = %self.kind(), error = %err, "server marker fetch failed; continuing")
            }
        }

        self.request_load(FeedLoadRequest::Reload).await;
    }

    fn publish_restored(&self, cache: &C) {
        let Some(cached) = cache.current_results() else {
            debug!(kind = %self.kind(), "no cached feed to restore");
            return;
        };
        let previous = self.shared.records.borrow().clone();
        let filtered = self.shared.source.filtered_view(cached);
        let next = publish(&previous, filtered, None, self.shared.config.compare_last_identity);
        info!(kind = %self.kind(), items = next.len(), "cached feed restored");
        self.shared.records.send_replace(next);
    }

    /// Resolves once nothing is in flight and the backlog is empty.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.loading.subscribe();
        if rx.wait_for(|loading| !*loading).await.is_err() {
            debug!("loader dropped while waiting for idle");
        }
    }

    // -- read marker --------------------------------------------------------

    /// Record `id` as read locally. Never moves the marker backwards.
    pub async fn mark_as_read(&self, id: &str) {
        let mut state = self.shared.state.lock().await;
        state
            .cache
            .update_to_newer_marker(MarkerPosition::local(id), true);
    }

    /// `true` iff `id` is strictly newer than the read marker. Always
    /// `false` while no marker exists.
    pub async fn is_unread(&self, id: &str) -> bool {
        let state = self.shared.state.lock().await;
        state
            .cache
            .current_read_marker()
            .is_some_and(|position| position.is_before(id))
    }

    pub async fn read_marker(&self) -> Option<MarkerPosition> {
        self.shared.state.lock().await.cache.current_read_marker()
    }

    // -- filters and cache lifecycle ----------------------------------------

    /// Re-derive the published snapshot from the cache after the filter
    /// settings changed. No fetch happens.
    pub async fn filters_changed(&self) {
        let state = self.shared.state.lock().await;
        let previous = self.shared.records.borrow().clone();
        let refreshed = pipeline::refilter(&state.cache, &previous, &self.shared.config, |cached| {
            self.shared.source.filtered_view(cached)
        });
        match refreshed {
            Some(next) => {
                debug!(kind = %self.kind(), items = next.len(), "republished after filter change");
                self.shared.records.send_replace(next);
            }
            None => debug!(kind = %self.kind(), "filter change with empty cache"),
        }
    }

    /// Persist the cached feed and read marker.
    pub async fn commit_to_cache(&self) -> Result<(), LoadError> {
        let state = self.shared.state.lock().await;
        state.cache.commit_to_cache().await.map_err(|err| {
            warn!(kind = %self.kind(), error = %err, "cache commit failed");
            LoadError::from(err)
        })
    }

    /// Drop the cached feed (memory and persisted snapshot) and publish an
    /// empty result.
    pub async fn clear_cache(&self) -> Result<(), LoadError> {
        let mut state = self.shared.state.lock().await;
        let cleared = state.cache.clear_cache().await;
        self.shared.records.send_replace(PublishedResult::empty());
        cleared.map_err(|err| {
            warn!(kind = %self.kind(), error = %err, "cache clear failed");
            LoadError::from(err)
        })
    }

    // -- observation --------------------------------------------------------

    pub fn records(&self) -> PublishedResult<S::Item> {
        self.shared.records.borrow().clone()
    }

    pub fn subscribe_records(&self) -> watch::Receiver<PublishedResult<S::Item>> {
        self.shared.records.subscribe()
    }

    pub fn current_error(&self) -> Option<LoadError> {
        self.shared.errors.borrow().clone()
    }

    pub fn subscribe_errors(&self) -> watch::Receiver<Option<LoadError>> {
        self.shared.errors.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.shared.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.shared.loading.subscribe()
    }

    /// Queued (not yet started) requests in service order.
    pub async fn pending_requests(&self) -> Vec<FeedLoadRequest> {
        self.shared.state.lock().await.scheduler.pending()
    }
}
