use fsk_schemas::FeedKind;
use serde::{Deserialize, Serialize};

use crate::MarkerPosition;

/// Read positions for one authenticated user, one slot per sub-feed.
///
/// Construct with [`ReadMarker::new`] or [`ReadMarker::empty`]; change with
/// [`ReadMarker::by_setting_position`], which returns a new value. The
/// mentions slot is normalised on every construction (see crate docs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReadMarkerRepr", into = "ReadMarkerRepr")]
pub struct ReadMarker {
    user_identity: String,
    home: Option<MarkerPosition>,
    notifications_all: Option<MarkerPosition>,
    notifications_mentions: Option<MarkerPosition>,
    notifications_with_account: Option<MarkerPosition>,
}

impl ReadMarker {
    pub fn new(
        user_identity: impl Into<String>,
        home: Option<MarkerPosition>,
        notifications_all: Option<MarkerPosition>,
        notifications_mentions: Option<MarkerPosition>,
        notifications_with_account: Option<MarkerPosition>,
    ) -> Self {
        let notifications_mentions = match (notifications_mentions, &notifications_all) {
            (Some(m), Some(all)) if !m.is_newer_than(all) => None,
            (m, _) => m,
        };
        Self {
            user_identity: user_identity.into(),
            home,
            notifications_all,
            notifications_mentions,
            notifications_with_account,
        }
    }

    /// A marker with no positions yet: nothing counts as unread.
    pub fn empty(user_identity: impl Into<String>) -> Self {
        Self::new(user_identity, None, None, None, None)
    }

    pub fn user_identity(&self) -> &str {
        &self.user_identity
    }

    pub fn home(&self) -> Option<&MarkerPosition> {
        self.home.as_ref()
    }

    pub fn notifications_all(&self) -> Option<&MarkerPosition> {
        self.notifications_all.as_ref()
    }

    /// The retained mentions-only position, `None` once collapsed.
    pub fn mentions_last_read(&self) -> Option<&MarkerPosition> {
        self.notifications_mentions.as_ref()
    }

    pub fn notifications_with_account(&self) -> Option<&MarkerPosition> {
        self.notifications_with_account.as_ref()
    }

    /// The stored slot for `kind`, without fallback.
    pub fn position(&self, kind: FeedKind) -> Option<&MarkerPosition> {
        match kind {
            FeedKind::Home => self.home.as_ref(),
            FeedKind::NotificationsAll => self.notifications_all.as_ref(),
            FeedKind::NotificationsMentions => self.notifications_mentions.as_ref(),
            FeedKind::NotificationsWithAccount => self.notifications_with_account.as_ref(),
        }
    }

    /// Effective read position for `kind`.
    ///
    /// Mentions fall back to the all-notifications position.
    pub fn last_read(&self, kind: FeedKind) -> Option<&MarkerPosition> {
        match kind {
            FeedKind::NotificationsMentions => self
                .notifications_mentions
                .as_ref()
                .or(self.notifications_all.as_ref()),
            other => self.position(other),
        }
    }

    /// `true` iff `id` is strictly newer than the effective position for
    /// `kind`. Always `false` without a position.
    pub fn is_unread(&self, kind: FeedKind, id: &str) -> bool {
        self.last_read(kind)
            .map(|p| p.is_before(id))
            .unwrap_or(false)
    }

    /// Return a marker with `position` stored for `kind`.
    ///
    /// With `enforce_forward_progress`, an existing position for `kind` is
    /// only replaced by a strictly newer one; otherwise `self` is returned
    /// unchanged.
    pub fn by_setting_position(
        &self,
        position: MarkerPosition,
        kind: FeedKind,
        enforce_forward_progress: bool,
    ) -> ReadMarker {
        if enforce_forward_progress {
            if let Some(prior) = self.position(kind) {
                if !position.is_newer_than(prior) {
                    return self.clone();
                }
            }
        }

        let mut home = self.home.clone();
        let mut all = self.notifications_all.clone();
        let mut mentions = self.notifications_mentions.clone();
        let mut with_account = self.notifications_with_account.clone();
        match kind {
            FeedKind::Home => home = Some(position),
            FeedKind::NotificationsAll => all = Some(position),
            FeedKind::NotificationsMentions => mentions = Some(position),
            FeedKind::NotificationsWithAccount => with_account = Some(position),
        }
        ReadMarker::new(self.user_identity.clone(), home, all, mentions, with_account)
    }

    /// Fold another marker (server-fetched or restored) into this one, slot by
    /// slot, never moving a position backwards.
    pub fn merged_with(&self, other: &ReadMarker) -> ReadMarker {
        const KINDS: [FeedKind; 4] = [
            FeedKind::Home,
            FeedKind::NotificationsAll,
            FeedKind::NotificationsMentions,
            FeedKind::NotificationsWithAccount,
        ];
        KINDS.iter().fold(self.clone(), |acc, kind| match other.position(*kind) {
            Some(p) => acc.by_setting_position(p.clone(), *kind, true),
            None => acc,
        })
    }
}

// ---------------------------------------------------------------------------
// Serde representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct ReadMarkerRepr {
    user_identity: String,
    #[serde(default)]
    home: Option<MarkerPosition>,
    #[serde(default)]
    notifications_all: Option<MarkerPosition>,
    #[serde(default)]
    notifications_mentions: Option<MarkerPosition>,
    #[serde(default)]
    notifications_with_account: Option<MarkerPosition>,
}

impl From<ReadMarkerRepr> for ReadMarker {
    fn from(r: ReadMarkerRepr) -> Self {
        ReadMarker::new(
            r.user_identity,
            r.home,
            r.notifications_all,
            r.notifications_mentions,
            r.notifications_with_account,
        )
    }
}

impl From<ReadMarker> for ReadMarkerRepr {
    fn from(m: ReadMarker) -> Self {
        Self {
            user_identity: m.user_identity,
            home: m.home,
            notifications_all: m.notifications_all,
            notifications_mentions: m.notifications_mentions,
            notifications_with_account: m.notifications_with_account,
        }
    }
}
