// src/error.rs
use thiserror::Error;

/// Failure classes for the acquisition pipeline.
///
/// Only `Network` is transient (retried by the remote fetcher); every other
/// class propagates immediately and triggers the local fallback tier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot reach the video server: {0}")]
    Network(String),

    #[error("request timed out after {0} ms; the server did not respond in time")]
    Timeout(u64),

    #[error("error parsing the server response: {0}")]
    Parse(String),

    #[error("the server response is not valid: {0}")]
    InvalidResponse(String),

    #[error("the server returned HTTP {status}")]
    Server { status: u16 },

    #[error("no video data found in {0}")]
    NoData(String),

    #[error("local fallback also failed: {source}")]
    FallbackFailed {
        #[source]
        source: Box<FetchError>,
    },

    #[error("invalid request URL: {0}")]
    BadUrl(String),
}

impl FetchError {
    /// Whether the remote fetcher may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }

    pub(crate) fn fallback_failed(local: FetchError) -> Self {
        FetchError::FallbackFailed {
            source: Box::new(local),
        }
    }
}
