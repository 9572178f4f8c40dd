//! Ordering rule for server-assigned item IDs.
//!
//! IDs are opaque decimal strings of varying length. A shorter ID is always
//! older; IDs of equal length compare lexicographically. This matches
//! snowflake-style IDs without risking integer overflow on parse.

use std::cmp::Ordering;

/// Total order over item IDs: length first, then lexicographic.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// `true` when `a` is strictly older than `b`.
pub fn is_older(a: &str, b: &str) -> bool {
    compare_ids(a, b) == Ordering::Less
}

/// `true` when `a` is strictly newer than `b`.
pub fn is_newer(a: &str, b: &str) -> bool {
    compare_ids(a, b) == Ordering::Greater
}
