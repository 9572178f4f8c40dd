//! Scripted fetch collaborator.
//!
//! Outcomes are queued per request and consumed in order; a request with
//! nothing left in its script gets an empty page. Every fetch is recorded,
//! and the number of fetches running at once is tracked so tests can check
//! the single-flight guarantee.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use fsk_cache::FeedPage;
use fsk_loader::{FeedSource, FetchError};
use fsk_marker::MarkerPosition;
use fsk_schemas::{FeedKind, FeedLoadRequest};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::Post;

type Outcome = Result<FeedPage<Post>, FetchError>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ScriptedSource {
    kind: FeedKind,
    script: Mutex<HashMap<FeedLoadRequest, VecDeque<Outcome>>>,
    calls: Mutex<Vec<FeedLoadRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Option<Semaphore>,
    muted: Mutex<Vec<String>>,
    server_marker: Mutex<Result<Option<MarkerPosition>, FetchError>>,
}

impl ScriptedSource {
    pub fn new(kind: FeedKind) -> Self {
        Self {
            kind,
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: None,
            muted: Mutex::new(Vec::new()),
            server_marker: Mutex::new(Ok(None)),
        }
    }

    /// Queue `page` as the next answer to `request`.
    pub fn respond(self, request: FeedLoadRequest, page: FeedPage<Post>) -> Self {
        self.push(request, Ok(page));
        self
    }

    /// Queue a failure as the next answer to `request`.
    pub fn fail(self, request: FeedLoadRequest, err: FetchError) -> Self {
        self.push(request, Err(err));
        self
    }

    /// Hold every fetch until [`release`](Self::release) lets it through.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn with_server_marker(self, marker: Result<Option<MarkerPosition>, FetchError>) -> Self {
        *lock(&self.server_marker) = marker;
        self
    }

    pub fn push(&self, request: FeedLoadRequest, outcome: Outcome) {
        lock(&self.script)
            .entry(request)
            .or_default()
            .push_back(outcome);
    }

    /// Let `n` gated fetches proceed. No-op for an ungated source.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Hide posts whose text contains any of `words` (case-insensitive).
    pub fn set_muted<I, W>(&self, words: I)
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        *lock(&self.muted) = words
            .into_iter()
            .map(|w| w.into().to_lowercase())
            .collect();
    }

    /// Requests fetched so far, in the order the fetches started.
    pub fn calls(&self) -> Vec<FeedLoadRequest> {
        lock(&self.calls).clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Poll until at least `n` fetches have started. `false` on timeout.
    pub async fn wait_for_calls(&self, n: usize) -> bool {
        for _ in 0..2_000 {
            if lock(&self.calls).len() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        false
    }

    fn next_outcome(&self, request: &FeedLoadRequest) -> Outcome {
        lock(&self.script)
            .get_mut(request)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(FeedPage::empty()))
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    type Cached = FeedPage<Post>;
    type Item = Post;

    fn kind(&self) -> FeedKind {
        self.kind
    }

    async fn fetch(&self, request: &FeedLoadRequest) -> Result<FeedPage<Post>, FetchError> {
        lock(&self.calls).push(request.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        debug!(request = %request, running, "scripted fetch started");

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    return Err(FetchError::Transport("gate closed".into()));
                }
            }
        }
        // Give competing tasks a chance to observe the in-flight fetch.
        tokio::task::yield_now().await;

        let outcome = self.next_outcome(request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    fn filtered_view(&self, cached: &FeedPage<Post>) -> Vec<Post> {
        let muted = lock(&self.muted);
        cached
            .items
            .iter()
            .filter(|p| {
                let text = p.text.to_lowercase();
                !muted.iter().any(|w| text.contains(w.as_str()))
            })
            .cloned()
            .collect()
    }

    async fn fetch_server_marker(&self) -> Result<Option<MarkerPosition>, FetchError> {
        lock(&self.server_marker).clone()
    }
}
