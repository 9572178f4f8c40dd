//! fsk-marker
//!
//! Per-user read markers ("last read" watermarks) for each sub-feed.
//!
//! # Invariants
//!
//! - **Immutable updates**: every change returns a new [`ReadMarker`]; the
//!   old value is never mutated in place.
//! - **Forward progress**: with `enforce_forward_progress`, a position only
//!   replaces an existing one when its ID is strictly newer.
//! - **Mentions collapse**: the mentions-only position is retained only while
//!   it is strictly newer than the all-notifications position; otherwise the
//!   mentions view falls back to the all-notifications marker.
//! - **Pure, no IO**: the caller decides where markers come from and where
//!   they go.

mod marker;
mod position;

pub use marker::ReadMarker;
pub use position::MarkerPosition;
