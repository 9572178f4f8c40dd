//! Scenario: ID Ordering Is a Strict Weak Ordering
//!
//! # Invariants under test
//! - `is_older` is irreflexive, asymmetric and transitive over a sample of
//!   snowflake-like IDs of mixed length.
//! - Shorter IDs are always older ("9" < "10"), regardless of the
//!   lexicographic comparison.
//! - Sorting with `compare_ids` agrees with numeric order for IDs without
//!   leading zeros.

use fsk_schemas::{compare_ids, is_newer, is_older};

const SAMPLE: &[&str] = &[
    "9",
    "10",
    "99",
    "100",
    "109",
    "110",
    "999",
    "1000",
    "109876543210987654",
    "110000000000000000",
    "1100000000000000000",
];

#[test]
fn is_older_is_irreflexive_and_asymmetric() {
    for a in SAMPLE {
        assert!(!is_older(a, a), "{a} older than itself");
        for b in SAMPLE {
            assert!(!(is_older(a, b) && is_older(b, a)), "{a} / {b} both older");
            assert_eq!(is_older(a, b), is_newer(b, a));
        }
    }
}

#[test]
fn is_older_is_transitive() {
    for a in SAMPLE {
        for b in SAMPLE {
            for c in SAMPLE {
                if is_older(a, b) && is_older(b, c) {
                    assert!(is_older(a, c), "{a} < {b} < {c} but not {a} < {c}");
                }
            }
        }
    }
}

#[test]
fn shorter_is_older_even_when_lexicographically_greater() {
    assert!("9" > "10");
    assert!(is_older("9", "10"));
    assert!(is_older("999", "1000"));
}

#[test]
fn sort_matches_numeric_order() {
    let mut shuffled: Vec<&str> = SAMPLE.iter().rev().copied().collect();
    shuffled.swap(0, 5);
    shuffled.sort_by(|a, b| compare_ids(a, b));

    let mut numeric: Vec<&str> = SAMPLE.to_vec();
    numeric.sort_by_key(|s| s.parse::<u128>().unwrap());

    assert_eq!(shuffled, numeric);
}
