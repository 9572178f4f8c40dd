use fsk_cache::CacheError;
use thiserror::Error;

/// Failure reported by a feed's fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with an application-level error.
    #[error("api error{}: {message}", .code.map(|c| format!(" code={c}")).unwrap_or_default())]
    Api { code: Option<u16>, message: String },
    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// What observers see on the error channel, and what immediate loads and
/// cache lifecycle calls return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// An immediate load was attempted while another load was in flight.
    #[error("a load is already in flight")]
    Busy,
    /// The task running an immediate load panicked or was cancelled.
    #[error("load task aborted: {0}")]
    Aborted(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_with_and_without_code() {
        let with = FetchError::Api {
            code: Some(429),
            message: "rate limited".into(),
        };
        let without = FetchError::Api {
            code: None,
            message: "gone".into(),
        };
        assert_eq!(with.to_string(), "api error code=429: rate limited");
        assert_eq!(without.to_string(), "api error: gone");
    }

    #[test]
    fn aborted_load_names_the_task_failure() {
        let e = LoadError::Aborted("task 7 panicked".into());
        assert_eq!(e.to_string(), "load task aborted: task 7 panicked");
    }

    #[test]
    fn load_error_wraps_fetch_error_transparently() {
        let e: LoadError = FetchError::Transport("connection reset".into()).into();
        assert_eq!(e.to_string(), "transport error: connection reset");
    }
}
