use std::io;
use std::path::PathBuf;

use folddl_archive::Aborted;
use folddl_fetch::FetchError;
use folddl_verify::VerifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown dataset '{name}'; choose one of: {known}")]
    NotFound { name: String, known: String },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("destination path is empty")]
    MissingDestination,

    #[error("invalid object URL for '{object}': {source}")]
    InvalidUrl { object: String, source: url::ParseError },

    #[error("failed to inspect existing destination '{path}': {source}")]
    Inspect { path: PathBuf, source: io::Error },

    #[error("failed to remove existing file with incorrect size '{path}': {source}")]
    RemoveStale { path: PathBuf, source: io::Error },

    #[error("failed to create destination directory '{path}': {source}")]
    CreateDestination { path: PathBuf, source: io::Error },

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("writing '{path}' failed: {source}")]
    Write { path: PathBuf, source: Aborted },

    #[error("download cancelled")]
    Cancelled,

    #[error("'{path}' holds {actual} bytes, expected {expected}")]
    SizeMismatch { path: PathBuf, expected: u64, actual: u64 },

    #[error("verification of '{path}' failed: {source}")]
    Verify { path: PathBuf, source: VerifyError },

    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DownloadError>;
