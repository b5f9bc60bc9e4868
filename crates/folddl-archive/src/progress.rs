use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative bytes written by the active write path.
///
/// Clones share the same counter. The write path is the only caller of
/// [`add`](Self::add); observers only [`load`](Self::load), so the value they
/// see never decreases.
#[derive(Debug, Clone, Default)]
pub struct TransferProgress(Arc<AtomicU64>);

impl TransferProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, bytes: u64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Writer that counts accepted bytes into a [`TransferProgress`].
pub struct ProgressWriter<W> {
    inner: W,
    progress: TransferProgress,
}

impl<W> ProgressWriter<W> {
    pub fn new(inner: W, progress: TransferProgress) -> Self {
        Self { inner, progress }
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.progress.add(n as u64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
