//! Error types crossing the page/privileged boundary and the save primitive.

use std::time::Duration;

/// Failure to reach or understand the page context. Always degrades to "no metadata".
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No page agent is listening (no page loaded, off-site page, or context gone).
    #[error("no listener in the page context")]
    NoListener,
    #[error("page context did not answer within {0:?}")]
    Timeout(Duration),
    #[error("invalid page snapshot: {0}")]
    InvalidPage(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure of the host save primitive. Logged, never retried.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] curl::Error),
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    #[error("save task failed: {0}")]
    Task(String),
}
