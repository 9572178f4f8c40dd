//! Scenario: Dedup & Publish
//!
//! # Invariants under test
//! - Dedup keeps the first occurrence of each identity and the relative
//!   order of survivors, for every prefix of a sequence with repeats.
//! - The "can load older" fallback: both sides non-empty compares the last
//!   identity; both empty is exhausted; one empty side may load more.
//! - An explicit hint always wins over the fallback.

use fsk_loader::publish::{dedup_by_identity, infer_can_load_older, publish};
use fsk_schemas::{PublishedItem, PublishedResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Note {
    id: &'static str,
    seq: usize,
}

impl PublishedItem for Note {
    type Id = &'static str;

    fn identity(&self) -> &'static str {
        self.id
    }
}

fn notes(ids: &[&'static str]) -> Vec<Note> {
    ids.iter()
        .enumerate()
        .map(|(seq, &id)| Note { id, seq })
        .collect()
}

#[test]
fn dedup_is_stable_for_every_prefix() {
    let input = notes(&["c", "a", "c", "b", "a", "d", "b", "c"]);
    for end in 0..=input.len() {
        let prefix = input[..end].to_vec();
        let out = dedup_by_identity(prefix.clone());

        // Survivors appear in their original relative order.
        assert!(out.windows(2).all(|w| w[0].seq < w[1].seq));
        // Each survivor is the first occurrence of its identity.
        for n in &out {
            let first = prefix.iter().find(|p| p.id == n.id).unwrap();
            assert_eq!(first.seq, n.seq);
        }
        // Nothing unique is lost.
        let mut ids: Vec<_> = prefix.iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(out.len(), ids.len());
    }
}

#[test]
fn fallback_heuristic_table() {
    let cases: &[(&[&str], &[&str], bool)] = &[
        (&["b", "a"], &["c", "b", "a"], false),
        (&["b", "a"], &["b", "a", "z"], true),
        (&[], &[], false),
        (&[], &["a"], true),
        (&["a"], &[], true),
    ];
    for (old, new, expected) in cases {
        assert_eq!(
            infer_can_load_older(&notes(old), &notes(new), true),
            *expected,
            "old={old:?} new={new:?}"
        );
    }
}

#[test]
fn explicit_hint_wins() {
    let previous = PublishedResult {
        items: notes(&["b", "a"]),
        can_load_older: true,
    };
    for hint in [true, false] {
        let out = publish(&previous, notes(&["c", "b", "a", "a"]), Some(hint), true);
        assert_eq!(out.can_load_older, hint);
        assert_eq!(out.identities(), vec!["c", "b", "a"]);
    }
}
