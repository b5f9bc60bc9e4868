//! Error types for folddl-fetch.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("download request for {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("server returned non-success status for {url}: {status} {reason}")]
    Status { url: String, status: u16, reason: String },
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// A throttled read gave up waiting for bandwidth because its scope was cancelled.
///
/// Travels inside an [`io::Error`] through the decode and write stages. The
/// kind is `Other`, not `Interrupted`, so retry-on-interrupt loops give up.
#[derive(Debug, Clone, Copy, Error)]
#[error("transfer cancelled while waiting for bandwidth")]
pub struct Cancelled;

impl Cancelled {
    pub fn into_io(self) -> io::Error {
        io::Error::other(self)
    }

    pub fn is_cause_of(err: &io::Error) -> bool {
        err.get_ref().is_some_and(|inner| inner.is::<Cancelled>())
    }
}
