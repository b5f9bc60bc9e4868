use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path traversal detected: entry '{entry}' escapes the destination root")]
    PathTraversal { entry: PathBuf },

    #[error("entry '{entry}' appears more than once in the archive")]
    DuplicateEntry { entry: PathBuf },

    #[error("entry '{entry}' does not name a file")]
    InvalidPath { entry: PathBuf },

    #[error("failed to start decompression: {0}")]
    Decoder(#[source] io::Error),

    #[error("failed to read the transfer stream: {0}")]
    Stream(#[source] io::Error),

    #[error("entry '{path}' is truncated: expected {expected} bytes, got {actual}")]
    Truncated { path: PathBuf, expected: u64, actual: u64 },

    #[error("failed to write '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A write stage that stopped part-way, with the bytes it had written so far.
///
/// The count is diagnostic only; a failed job restarts from scratch.
#[derive(Debug, thiserror::Error)]
#[error("aborted after writing {written} bytes: {source}")]
pub struct Aborted {
    pub written: u64,
    #[source]
    pub source: Error,
}
