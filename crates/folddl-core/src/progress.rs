use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use folddl_archive::{TransferProgress, WritePlan};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::event::{EventSink, ProgressEvent};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Where the sampler reads the current size from.
#[derive(Clone, Debug)]
pub enum ProgressSource {
    /// Shared counter bumped by tar extraction.
    Counter(TransferProgress),
    /// Length of the file a flat copy is growing.
    FileSize(PathBuf),
}

impl ProgressSource {
    pub fn for_plan(plan: &WritePlan, counter: &TransferProgress) -> Self {
        match plan {
            WritePlan::Extract(_) => Self::Counter(counter.clone()),
            WritePlan::CopyFlat(path) => Self::FileSize(path.clone()),
        }
    }

    /// A file that does not exist yet reads as empty.
    pub async fn sample(&self) -> u64 {
        match self {
            Self::Counter(counter) => counter.load(),
            Self::FileSize(path) => tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0),
        }
    }
}

/// Background task reporting a job's progress on a fixed interval.
///
/// The first report is due one interval after spawning. Once [`stop`](Self::stop)
/// returns the task has exited and will not report again.
#[derive(Debug)]
pub struct ProgressSampler {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressSampler {
    pub fn spawn(
        source: ProgressSource,
        dataset: String,
        total: u64,
        interval: Duration,
        sink: Arc<dyn EventSink>,
        stop: CancellationToken,
    ) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let token = stop.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let bytes = source.sample().await.max(last);
                if token.is_cancelled() {
                    break;
                }
                last = bytes;
                sink.progress(&ProgressEvent { dataset: dataset.clone(), bytes, total });
            }

            debug!(%dataset, bytes = last, "progress sampler stopped");
        });

        Self { stop, handle }
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(self) {
        self.stop.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "progress sampler ended abnormally");
        }
    }
}
