//! Unused-key guard.
//!
//! The loader reads three scalar keys under `/loader`. Anything else in the
//! merged config (a typo, a key for some other component) is reported as
//! unused; callers choose whether that is a warning or an error.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Pointers of config values nothing reads (sorted).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Pointers read by [`crate::LoaderConfig::from_config_json`].
pub fn consumed_pointers() -> &'static [&'static str] {
    &[
        "/loader/reload_more_threshold",
        "/loader/expected_page_size",
        "/loader/compare_last_identity",
    ]
}

/// Produce an unused-key report.
/// `Fail` returns an error when unused keys exist; `Warn` logs and returns
/// the report.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut unused = Vec::new();
    walk(config_json, String::new(), &mut unused);
    unused.sort();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };
    if report.is_clean() {
        return Ok(report);
    }

    let first = report
        .unused_leaf_pointers
        .iter()
        .take(12)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match policy {
        UnusedKeyPolicy::Fail => bail!(
            "CONFIG_UNUSED_KEYS: {} unused config key(s) under the loader config: {first}",
            report.unused_leaf_pointers.len()
        ),
        UnusedKeyPolicy::Warn => warn!(
            unused = report.unused_leaf_pointers.len(),
            first = %first,
            "CONFIG_UNUSED_KEYS"
        ),
    }
    Ok(report)
}

/// Stops at consumed pointers; any other non-object value is a leaf nobody
/// reads. Empty tables carry no keys.
fn walk(v: &Value, path: String, out: &mut Vec<String>) {
    if consumed_pointers().contains(&path.as_str()) {
        return;
    }
    match v {
        Value::Object(map) => {
            for (key, child) in map {
                // JSON Pointer escaping, so "a/b" cannot alias "/a/b".
                let token = key.replace('~', "~0").replace('/', "~1");
                walk(child, format!("{path}/{token}"), out);
            }
        }
        _ if path.is_empty() => out.push("/".to_string()),
        _ => out.push(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn consumed_keys_are_clean_and_siblings_are_not() {
        let cfg = json!({
            "loader": {
                "reload_more_threshold": 20,
                "reload_more_thresholdx": 5,
                "compare_last_identity": true
            }
        });
        let report = report_unused_keys(&cfg, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(
            report.unused_leaf_pointers,
            vec!["/loader/reload_more_thresholdx".to_string()]
        );
    }

    #[test]
    fn arrays_and_empty_tables() {
        let cfg = json!({ "loader": {}, "feeds": ["home", "mentions"] });
        let report = report_unused_keys(&cfg, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(report.unused_leaf_pointers, vec!["/feeds".to_string()]);
    }

    #[test]
    fn keys_with_slashes_are_escaped() {
        let cfg = json!({ "a/b~c": 1 });
        let report = report_unused_keys(&cfg, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(report.unused_leaf_pointers, vec!["/a~1b~0c".to_string()]);
    }

    #[test]
    fn fail_policy_lists_the_keys() {
        let cfg = json!({ "loader": { "page_size": 10 } });
        let err = report_unused_keys(&cfg, UnusedKeyPolicy::Fail).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("CONFIG_UNUSED_KEYS: 1 unused"));
        assert!(msg.contains("/loader/page_size"));
    }
}
