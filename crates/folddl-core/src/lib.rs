//! Dataset registry and the download-decompress-extract-verify pipeline.
//!
//! One [`DownloadJob`] names a [`Dataset`], a destination root and an
//! optional bandwidth ceiling. [`DownloadService::download`] runs it end to
//! end: skip if the destination already holds a complete artifact, otherwise
//! fetch, throttle, decompress, write, verify and report.

pub use config::{DEFAULT_BASE_URL, DownloadConfig, DownloadJob};
pub use error::{DownloadError, RegistryError, Result};
pub use event::{CompletionEvent, EventSink, ProgressEvent, TracingSink};
pub use fs::{Existing, inspect_existing, tree_size};
pub use progress::{ProgressSource, ProgressSampler};
pub use registry::{ARCHIVE_SUFFIX, Dataset, Registry};
pub use service::{DownloadService, JobOutcome};
pub use verify::{Verification, verify_file, verify_tree};

mod config;
mod error;
mod event;
mod fs;
mod progress;
mod registry;
mod service;
mod verify;
