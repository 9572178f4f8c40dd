//! `fsk replay`: drive a feed loader from a JSON script.
//!
//! Script shape:
//!
//! ```json
//! {
//!   "user": "alice",
//!   "kind": "home",
//!   "server_marker": "12",
//!   "muted": ["spoiler"],
//!   "responses": {
//!     "reload": [{ "items": [{ "id": "3", "text": "hi" }] }, { "error": "timeout" }],
//!     "older":  [{ "items": [] }]
//!   },
//!   "steps": ["first_load", "older", "mark_read:3", "mute:hi", "unmute", "commit", "clear"]
//! }
//! ```
//!
//! Responses are consumed in order per request; a request with nothing left
//! gets an empty page. One line is printed per step once the loader is idle.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fsk_cache::{FeedPage, ListCache, MemorySnapshotStore};
use fsk_loader::{FeedLoader, FeedSource, FetchError};
use fsk_marker::MarkerPosition;
use fsk_schemas::{FeedKind, FeedLoadRequest, PublishedItem};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{read_text, resolve_loader_config};

// ---------------------------------------------------------------------------
// Script model
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl PublishedItem for Entry {
    type Id = String;

    fn identity(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Page { items: Vec<Entry> },
    Fail { error: String },
}

fn default_user() -> String {
    "local".to_string()
}

fn default_kind() -> FeedKind {
    FeedKind::Home
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_kind")]
    pub kind: FeedKind,
    #[serde(default)]
    pub server_marker: Option<String>,
    #[serde(default)]
    pub muted: Vec<String>,
    #[serde(default)]
    pub responses: BTreeMap<String, Vec<Response>>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    FirstLoad,
    Load(FeedLoadRequest),
    MarkRead(String),
    Mute(String),
    Unmute,
    Commit,
    Clear,
}

impl Step {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw {
            "first_load" => return Ok(Step::FirstLoad),
            "unmute" => return Ok(Step::Unmute),
            "commit" => return Ok(Step::Commit),
            "clear" => return Ok(Step::Clear),
            _ => {}
        }
        if let Some(id) = raw.strip_prefix("mark_read:").filter(|id| !id.is_empty()) {
            return Ok(Step::MarkRead(id.to_string()));
        }
        if let Some(word) = raw.strip_prefix("mute:").filter(|w| !w.is_empty()) {
            return Ok(Step::Mute(word.to_string()));
        }
        match FeedLoadRequest::parse(raw) {
            Some(request) => Ok(Step::Load(request)),
            None => bail!("unknown replay step '{raw}'"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::FirstLoad => f.write_str("first_load"),
            Step::Load(request) => write!(f, "{request}"),
            Step::MarkRead(id) => write!(f, "mark_read:{id}"),
            Step::Mute(word) => write!(f, "mute:{word}"),
            Step::Unmute => f.write_str("unmute"),
            Step::Commit => f.write_str("commit"),
            Step::Clear => f.write_str("clear"),
        }
    }
}

// ---------------------------------------------------------------------------
// Replay source
// ---------------------------------------------------------------------------

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch collaborator answering from the script.
pub struct ReplaySource {
    kind: FeedKind,
    responses: Mutex<HashMap<FeedLoadRequest, VecDeque<Response>>>,
    muted: Mutex<Vec<String>>,
    server_marker: Option<String>,
}

impl ReplaySource {
    pub fn from_script(script: &Script) -> Result<Self> {
        let mut responses = HashMap::new();
        for (label, queue) in &script.responses {
            let request = FeedLoadRequest::parse(label)
                .with_context(|| format!("invalid request label in responses: '{label}'"))?;
            responses.insert(request, queue.iter().cloned().collect::<VecDeque<_>>());
        }
        Ok(Self {
            kind: script.kind,
            responses: Mutex::new(responses),
            muted: Mutex::new(script.muted.iter().map(|w| w.to_lowercase()).collect()),
            server_marker: script.server_marker.clone(),
        })
    }

    fn mute(&self, word: &str) {
        lock(&self.muted).push(word.to_lowercase());
    }

    fn unmute(&self) {
        lock(&self.muted).clear();
    }
}

#[async_trait]
impl FeedSource for ReplaySource {
    type Cached = FeedPage<Entry>;
    type Item = Entry;

    fn kind(&self) -> FeedKind {
        self.kind
    }

    async fn fetch(&self, request: &FeedLoadRequest) -> Result<FeedPage<Entry>, FetchError> {
        let next = lock(&self.responses)
            .get_mut(request)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Response::Page { items }) => Ok(FeedPage::new(items)),
            Some(Response::Fail { error }) => Err(FetchError::Transport(error)),
            None => Ok(FeedPage::empty()),
        }
    }

    fn filtered_view(&self, cached: &FeedPage<Entry>) -> Vec<Entry> {
        let muted = lock(&self.muted);
        cached
            .items
            .iter()
            .filter(|e| {
                let text = e.text.to_lowercase();
                !muted.iter().any(|w| text.contains(w.as_str()))
            })
            .cloned()
            .collect()
    }

    async fn fetch_server_marker(&self) -> Result<Option<MarkerPosition>, FetchError> {
        Ok(self
            .server_marker
            .as_ref()
            .map(|id| MarkerPosition::server(id.clone(), Utc::now())))
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

type ReplayLoader = FeedLoader<ListCache<Entry>, ReplaySource>;

/// Execute `fsk replay`.
pub async fn run(script_path: &str, config_paths: &[String], strict: bool) -> Result<()> {
    let resolved = resolve_loader_config(config_paths, strict)?;
    if let Some(hash) = &resolved.config_hash {
        println!("config_hash={hash}");
    }

    let raw = read_text(script_path)?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("{script_path} must contain a valid replay script"))?;
    let steps = script
        .steps
        .iter()
        .map(|s| Step::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let source = ReplaySource::from_script(&script)?;
    let cache = ListCache::new(script.user.clone(), script.kind)
        .with_store(Arc::new(MemorySnapshotStore::new()));
    let loader = FeedLoader::new(cache, source, resolved.loader);
    info!(kind = %script.kind, steps = steps.len(), "replay starting");

    for (n, step) in steps.iter().enumerate() {
        let outcome = apply(&loader, step).await;
        loader.wait_idle().await;
        println!("{}", render_line(n + 1, step, &loader, outcome).await);
    }
    Ok(())
}

async fn apply(loader: &ReplayLoader, step: &Step) -> Option<String> {
    match step {
        Step::FirstLoad => loader.do_first_load().await,
        Step::Load(request) => loader.request_load(request.clone()).await,
        Step::MarkRead(id) => loader.mark_as_read(id).await,
        Step::Mute(word) => {
            loader.source().mute(word);
            loader.filters_changed().await;
        }
        Step::Unmute => {
            loader.source().unmute();
            loader.filters_changed().await;
        }
        Step::Commit => return loader.commit_to_cache().await.err().map(|e| e.to_string()),
        Step::Clear => return loader.clear_cache().await.err().map(|e| e.to_string()),
    }
    None
}

async fn render_line(
    n: usize,
    step: &Step,
    loader: &ReplayLoader,
    step_error: Option<String>,
) -> String {
    let records = loader.records();
    let ids: Vec<String> = records.identities();
    let marker = loader
        .read_marker()
        .await
        .map(|p| p.last_read_id().to_string())
        .unwrap_or_else(|| "none".to_string());
    let error = step_error
        .or_else(|| loader.current_error().map(|e| e.to_string()))
        .unwrap_or_else(|| "none".to_string());
    format!(
        "step={n} op={step} items={} can_load_older={} marker={marker} error={error}",
        ids.join(","),
        records.can_load_older
    )
}
