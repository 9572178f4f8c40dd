use thiserror::Error;

/// Failures of the persistence hooks. Always best-effort from the loader's
/// point of view: logged, never surfaced as a load error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backing store could not read or write.
    #[error("cache store error: {0}")]
    Store(String),
    /// A stored snapshot could not be encoded or decoded.
    #[error("cache decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Decode(e.to_string())
    }
}
