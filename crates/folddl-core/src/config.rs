use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{DownloadError, Result};
use crate::registry::Dataset;

/// Object store prefix every dataset is published under.
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/alphafold-databases/v3.0/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Settings shared by every job a [`DownloadService`](crate::DownloadService) runs.
#[derive(Clone, Debug)]
pub struct DownloadConfig {
    base_url: Url,
    timeout: Duration,
    sample_interval: Duration,
}

impl DownloadConfig {
    /// `base_url` is treated as a directory prefix whether or not it ends in `/`.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub fn object_url(&self, dataset: &Dataset) -> Result<Url> {
        let object = dataset.object_name();
        self.base_url
            .join(&object)
            .map_err(|source| DownloadError::InvalidUrl { object, source })
    }
}

/// One dataset, one destination root, an optional bandwidth ceiling.
#[derive(Clone, Debug)]
pub struct DownloadJob {
    pub dataset: Dataset,
    pub destination: PathBuf,
    /// Bytes per second of compressed input; `None` is unbounded.
    pub rate: Option<NonZeroU64>,
}

impl DownloadJob {
    pub fn new(dataset: Dataset, destination: impl Into<PathBuf>) -> Self {
        Self {
            dataset,
            destination: destination.into(),
            rate: None,
        }
    }

    /// Ceiling in KiB/s. Zero lifts the limit.
    pub fn with_rate_kib(mut self, kib_per_second: u64) -> Self {
        self.rate = NonZeroU64::new(kib_per_second.saturating_mul(1024));
        self
    }
}
