use chrono::{DateTime, Utc};
use fsk_schemas::{compare_ids, is_newer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where a read position came from.
///
/// Both variants reduce to a single comparable `last_read_id`; the extra
/// fields are kept for diagnostics and for syncing back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MarkerPosition {
    /// Confirmed by the server's marker endpoint.
    Server {
        last_read_id: String,
        updated_at: DateTime<Utc>,
        /// Optimistic-concurrency version reported by the server, if any.
        version: Option<u64>,
    },
    /// Set on this device and not (yet) confirmed by the server.
    Local {
        last_read_id: String,
        set_at: DateTime<Utc>,
    },
}

impl MarkerPosition {
    pub fn server(last_read_id: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        MarkerPosition::Server {
            last_read_id: last_read_id.into(),
            updated_at,
            version: None,
        }
    }

    /// A local position stamped with the current time.
    pub fn local(last_read_id: impl Into<String>) -> Self {
        MarkerPosition::Local {
            last_read_id: last_read_id.into(),
            set_at: Utc::now(),
        }
    }

    pub fn last_read_id(&self) -> &str {
        match self {
            MarkerPosition::Server { last_read_id, .. } => last_read_id,
            MarkerPosition::Local { last_read_id, .. } => last_read_id,
        }
    }

    pub fn is_server_confirmed(&self) -> bool {
        matches!(self, MarkerPosition::Server { .. })
    }

    /// `true` when this position is strictly past `other`.
    pub fn is_newer_than(&self, other: &MarkerPosition) -> bool {
        is_newer(self.last_read_id(), other.last_read_id())
    }

    /// `true` when `id` lies strictly after this position, i.e. is unread.
    pub fn is_before(&self, id: &str) -> bool {
        compare_ids(id, self.last_read_id()) == Ordering::Greater
    }
}
