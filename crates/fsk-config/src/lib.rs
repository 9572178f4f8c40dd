//! fsk-config
//!
//! Layered YAML configuration for the feed loader's tunables.
//!
//! Documents merge in order (earlier = base, later = override) with a deep
//! JSON merge, are canonicalised and hashed (SHA-256) so a run can log
//! exactly which tunables it used, then deserialise into [`LoaderConfig`].

mod layered;
mod loader;
mod unused;

pub use layered::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use loader::{
    LoaderConfig, DEFAULT_EXPECTED_PAGE_SIZE, DEFAULT_RELOAD_MORE_THRESHOLD,
};
pub use unused::{consumed_pointers, report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
