use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical sub-feeds that carry their own read position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Home,
    NotificationsAll,
    NotificationsMentions,
    NotificationsWithAccount,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Home => "home",
            FeedKind::NotificationsAll => "notifications_all",
            FeedKind::NotificationsMentions => "notifications_mentions",
            FeedKind::NotificationsWithAccount => "notifications_with_account",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Load request
// ---------------------------------------------------------------------------

/// A request to load one page of a feed.
///
/// Equality is structural (same variant, same anchor ID); the scheduler uses
/// it to drop a request identical to one already waiting in the backlog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedLoadRequest {
    /// Page below the oldest loaded item.
    Older,
    /// Page above the newest loaded item.
    Newer,
    /// Discard everything and load the newest page.
    Reload,
    /// Items newer than `id`, spliced in right above it (gap filling).
    NewerThan(String),
    /// Items older than `id`, spliced in right below it (gap filling).
    OlderThan(String),
}

impl FeedLoadRequest {
    /// Where a page fetched for this request lands in the cached feed.
    pub fn insert_location(&self) -> InsertLocation {
        match self {
            FeedLoadRequest::Older => InsertLocation::End,
            FeedLoadRequest::Newer => InsertLocation::Start,
            FeedLoadRequest::Reload => InsertLocation::Replace,
            FeedLoadRequest::NewerThan(id) => InsertLocation::InsertAfter(id.clone()),
            FeedLoadRequest::OlderThan(id) => InsertLocation::InsertBefore(id.clone()),
        }
    }

    /// Parse the textual form produced by `Display` (`older`, `newer`,
    /// `reload`, `newer_than:<id>`, `older_than:<id>`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s {
            "older" => return Some(FeedLoadRequest::Older),
            "newer" => return Some(FeedLoadRequest::Newer),
            "reload" => return Some(FeedLoadRequest::Reload),
            _ => {}
        }
        let (head, id) = s.split_once(':')?;
        if id.is_empty() {
            return None;
        }
        match head {
            "newer_than" => Some(FeedLoadRequest::NewerThan(id.to_string())),
            "older_than" => Some(FeedLoadRequest::OlderThan(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for FeedLoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLoadRequest::Older => f.write_str("older"),
            FeedLoadRequest::Newer => f.write_str("newer"),
            FeedLoadRequest::Reload => f.write_str("reload"),
            FeedLoadRequest::NewerThan(id) => write!(f, "newer_than:{id}"),
            FeedLoadRequest::OlderThan(id) => write!(f, "older_than:{id}"),
        }
    }
}

/// Splice point for a freshly fetched page.
///
/// `InsertAfter` / `InsertBefore` are chronological: the page holds items
/// newer / older than the anchor. In a newest-first list that puts it right
/// above / below the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertLocation {
    Start,
    End,
    Replace,
    InsertAfter(String),
    InsertBefore(String),
}
