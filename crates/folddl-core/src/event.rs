use tracing::info;

/// Cumulative bytes observed for a job in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub dataset: String,
    pub bytes: u64,
    /// Expected final size, 0 when unknown.
    pub total: u64,
}

/// Final record of a successful job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionEvent {
    pub dataset: String,
    pub size: u64,
    pub total: u64,
    /// Hex SHA-256 of a flat artifact; `None` for trees or when hashing failed.
    pub hash: Option<String>,
    pub archive: bool,
}

/// Receiver for structured job events.
///
/// Shared between the orchestrator and the sampler task, so implementations
/// must be callable from any thread.
pub trait EventSink: Send + Sync {
    fn progress(&self, event: &ProgressEvent);
    fn completed(&self, event: &CompletionEvent);
}

/// Emits job events as `tracing` records.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn progress(&self, event: &ProgressEvent) {
        info!(
            dataset = %event.dataset,
            size = event.bytes,
            total = event.total,
            unit = "bytes",
            kind = "download",
            "Download progress"
        );
    }

    fn completed(&self, event: &CompletionEvent) {
        if event.archive {
            info!(
                dataset = %event.dataset,
                size = event.size,
                total = event.total,
                unit = "bytes",
                kind = "download",
                "Tar extraction completed"
            );
        } else {
            info!(
                dataset = %event.dataset,
                size = event.size,
                total = event.total,
                unit = "bytes",
                kind = "download",
                hash = event.hash.as_deref().unwrap_or_default(),
                "Download completed"
            );
        }
    }
}
