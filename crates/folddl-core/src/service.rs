use std::io;
use std::sync::Arc;

use folddl_archive::{Aborted, Materialized, TransferProgress, WritePlan};
use folddl_fetch::{Cancelled, HttpClient, cancellable, throttle};
use tokio_util::io::{StreamReader, SyncIoBridge};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::config::{DownloadConfig, DownloadJob};
use crate::error::{DownloadError, Result};
use crate::event::{CompletionEvent, EventSink};
use crate::fs::{Existing, inspect_existing};
use crate::progress::{ProgressSource, ProgressSampler};
use crate::registry::Dataset;
use crate::verify::{Verification, verify_file, verify_tree};

/// How a job ended when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The destination already held the complete artifact; nothing was fetched.
    Skipped { size: u64 },
    Downloaded(Verification),
}

/// Runs download jobs against one object store.
pub struct DownloadService<C> {
    client: C,
    config: DownloadConfig,
    sink: Arc<dyn EventSink>,
}

impl<C: HttpClient> DownloadService<C> {
    pub fn new(client: C, config: DownloadConfig, sink: Arc<dyn EventSink>) -> Self {
        Self { client, config, sink }
    }

    /// Bring `job.destination` to the complete state of `job.dataset`.
    ///
    /// A destination that already matches the expected size is left alone.
    /// Otherwise the object is fetched, throttled, decompressed and written
    /// in one streaming pass while a sampler reports progress. The sampler
    /// has stopped by the time this returns, whatever the outcome. Cancelling
    /// `cancel` aborts the transfer with [`DownloadError::Cancelled`].
    #[instrument(skip_all, fields(dataset = job.dataset.name()))]
    pub async fn download(&self, job: &DownloadJob, cancel: &CancellationToken) -> Result<JobOutcome> {
        if job.destination.as_os_str().is_empty() {
            return Err(DownloadError::MissingDestination);
        }

        let dataset = &job.dataset;
        let plan = dataset.write_plan(&job.destination);

        if let Some(size) = self.check_existing(&plan, dataset).await? {
            return Ok(JobOutcome::Skipped { size });
        }

        tokio::fs::create_dir_all(&job.destination)
            .await
            .map_err(|source| DownloadError::CreateDestination {
                path: job.destination.clone(),
                source,
            })?;

        let url = self.config.object_url(dataset)?;
        info!(%url, destination = %plan.target().display(), rate = ?job.rate, "starting download");

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            body = self.client.get(&url) => body?,
        };

        let scope = cancel.child_token();
        let progress = TransferProgress::new();
        let sampler = ProgressSampler::spawn(
            ProgressSource::for_plan(&plan, &progress),
            dataset.name().to_string(),
            dataset.expected_size().unwrap_or(0),
            self.config.sample_interval(),
            Arc::clone(&self.sink),
            scope.clone(),
        );

        let reader = throttle(
            StreamReader::new(cancellable(body, scope.clone())),
            job.rate,
            scope.clone(),
        );
        let bridge = SyncIoBridge::new(reader);
        let compression = dataset.compression();
        let write_plan = plan.clone();
        let written = tokio::task::spawn_blocking(move || {
            let decoder = compression
                .decoder(bridge)
                .map_err(|source| Aborted { written: 0, source })?;
            write_plan.materialize(decoder, &progress)
        })
        .await;

        scope.cancel();
        sampler.stop().await;

        let materialized = match written? {
            Ok(materialized) => materialized,
            Err(aborted) if cancel.is_cancelled() || caused_by_cancel(&aborted) => {
                info!(written = aborted.written, "download cancelled");
                return Err(DownloadError::Cancelled);
            }
            Err(source) => {
                return Err(DownloadError::Write { path: plan.target().to_path_buf(), source });
            }
        };

        let verification = self.verify(&plan, dataset, &materialized).await?;
        self.sink.completed(&CompletionEvent {
            dataset: dataset.name().to_string(),
            size: verification.size,
            total: dataset.expected_size().unwrap_or(0),
            hash: verification.hash.clone(),
            archive: plan.is_archive(),
        });

        Ok(JobOutcome::Downloaded(verification))
    }

    /// `Some(size)` when the destination is already complete.
    async fn check_existing(&self, plan: &WritePlan, dataset: &Dataset) -> Result<Option<u64>> {
        let target = plan.target().to_path_buf();
        let snapshot = plan.clone();
        let expected = dataset.expected_size();
        let existing = tokio::task::spawn_blocking(move || inspect_existing(&snapshot, expected))
            .await?
            .map_err(|source| DownloadError::Inspect { path: target.clone(), source })?;

        match existing {
            Existing::Absent => Ok(None),
            Existing::Complete(size) => {
                info!(path = %target.display(), size, "destination already complete, skipping download");
                Ok(Some(size))
            }
            Existing::Stale(size) if plan.is_archive() => {
                info!(path = %target.display(), size, expected = ?expected, "extracting over existing directory");
                Ok(None)
            }
            Existing::Stale(size) => {
                info!(path = %target.display(), size, expected = ?expected, "removing existing file with incorrect size");
                tokio::fs::remove_file(&target)
                    .await
                    .map_err(|source| DownloadError::RemoveStale { path: target.clone(), source })?;
                Ok(None)
            }
        }
    }

    async fn verify(
        &self,
        plan: &WritePlan,
        dataset: &Dataset,
        materialized: &Materialized,
    ) -> Result<Verification> {
        match materialized {
            Materialized::Tree(report) => {
                info!(
                    entries = report.entries,
                    files = report.files,
                    directories = report.directories,
                    skipped = report.skipped,
                    "extraction finished"
                );
                verify_tree(plan.target(), dataset, report.bytes)
            }
            Materialized::File { .. } => {
                let path = plan.target().to_path_buf();
                let dataset = dataset.clone();
                tokio::task::spawn_blocking(move || verify_file(&path, &dataset)).await?
            }
        }
    }
}

/// Whether a write stage stopped because a throttled read was cancelled.
fn caused_by_cancel(aborted: &Aborted) -> bool {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&aborted.source);
    while let Some(err) = cause {
        if err.is::<Cancelled>() {
            return true;
        }
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if Cancelled::is_cause_of(io_err) {
                return true;
            }
        }
        cause = err.source();
    }
    false
}
