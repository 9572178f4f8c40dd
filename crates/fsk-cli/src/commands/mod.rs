//! Command handler modules for the `fsk` CLI.
//!
//! Shared utilities used by multiple command paths live here.

pub mod replay;

use anyhow::{Context, Result};
use fsk_config::{LoaderConfig, UnusedKeyPolicy};
use std::fs;

/// Loader tunables plus the hash of the documents they came from
/// (`None` when running on defaults).
pub struct ResolvedConfig {
    pub config_hash: Option<String>,
    pub loader: LoaderConfig,
}

/// Merge `paths` (in order) into a [`LoaderConfig`]. No paths means
/// defaults.
pub fn resolve_loader_config(paths: &[String], strict: bool) -> Result<ResolvedConfig> {
    if paths.is_empty() {
        return Ok(ResolvedConfig {
            config_hash: None,
            loader: LoaderConfig::default(),
        });
    }

    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = fsk_config::load_layered_yaml(&path_refs)?;
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    fsk_config::report_unused_keys(&loaded.config_json, policy)?;
    let loader = loaded.loader()?;
    Ok(ResolvedConfig {
        config_hash: Some(loaded.config_hash),
        loader,
    })
}

/// Read a UTF-8 text file, tolerating a leading BOM.
pub fn read_text(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec()).with_context(|| format!("{path} must be UTF-8 text"))
}
