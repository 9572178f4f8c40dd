use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reload results larger than this leave "can load older" on.
///
/// Sized against [`DEFAULT_EXPECTED_PAGE_SIZE`]: roughly half a page is
/// enough content for a loading indicator to sit below the fold.
pub const DEFAULT_RELOAD_MORE_THRESHOLD: usize = 20;

/// Page size the server is assumed to return.
pub const DEFAULT_EXPECTED_PAGE_SIZE: usize = 40;

/// Tunables of the merge-and-publish pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// After a reload, "can load older" is true iff the filtered result has
    /// strictly more items than this.
    pub reload_more_threshold: usize,
    /// Page size the fetch collaborator returns; the threshold must stay
    /// below it.
    pub expected_page_size: usize,
    /// Fallback heuristic: compare the oldest published identity before and
    /// after a load. When off, any non-empty result may load older.
    pub compare_last_identity: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            reload_more_threshold: DEFAULT_RELOAD_MORE_THRESHOLD,
            expected_page_size: DEFAULT_EXPECTED_PAGE_SIZE,
            compare_last_identity: true,
        }
    }
}

impl LoaderConfig {
    /// Read the `/loader` section of a merged config document.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let cfg = match config_json.pointer("/loader") {
            None | Some(Value::Null) => LoaderConfig::default(),
            Some(section) => serde_json::from_value(section.clone())
                .context("invalid /loader config section")?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.expected_page_size == 0 {
            bail!("CONFIG_INVALID /loader/expected_page_size must be > 0");
        }
        if self.reload_more_threshold >= self.expected_page_size {
            bail!(
                "CONFIG_INVALID /loader/reload_more_threshold ({}) must be below \
                 /loader/expected_page_size ({})",
                self.reload_more_threshold,
                self.expected_page_size
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_yields_defaults() {
        let cfg = LoaderConfig::from_config_json(&serde_json::json!({})).unwrap();
        assert_eq!(cfg, LoaderConfig::default());
        assert_eq!(cfg.reload_more_threshold, 20);
        assert_eq!(cfg.expected_page_size, 40);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let json = serde_json::json!({ "loader": { "reload_more_threshold": 5 } });
        let cfg = LoaderConfig::from_config_json(&json).unwrap();
        assert_eq!(cfg.reload_more_threshold, 5);
        assert_eq!(cfg.expected_page_size, 40);
        assert!(cfg.compare_last_identity);
    }

    #[test]
    fn threshold_at_or_above_page_size_is_rejected() {
        let json = serde_json::json!({
            "loader": { "reload_more_threshold": 40, "expected_page_size": 40 }
        });
        let err = LoaderConfig::from_config_json(&json).unwrap_err();
        assert!(err.to_string().contains("CONFIG_INVALID"));
    }

    #[test]
    fn unknown_loader_key_is_rejected() {
        let json = serde_json::json!({ "loader": { "page_sise": 40 } });
        assert!(LoaderConfig::from_config_json(&json).is_err());
    }
}
