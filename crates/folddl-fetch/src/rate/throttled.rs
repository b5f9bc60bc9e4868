//! Throttled reader implementation for bandwidth limiting.
//!
//! Every read is charged against a [`TokenBucket`] before the underlying
//! reader is touched, so large read buffers cannot burst past the ceiling.

use std::future::Future;
use std::io;
use std::num::NonZeroU64;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{Instant, Sleep};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::Cancelled;
use crate::rate::bucket::TokenBucket;

/// A reader that throttles the rate of data transfer.
pub struct ThrottledReader<R> {
    inner: R,
    bucket: TokenBucket,
    granted: usize,
    delay: Option<Pin<Box<Sleep>>>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<R> ThrottledReader<R> {
    /// Limit `inner` to `bytes_per_second`. Waiting for tokens ends with a
    /// [`Cancelled`] error once `cancel` fires.
    pub fn new(inner: R, bytes_per_second: NonZeroU64, cancel: CancellationToken) -> Self {
        Self {
            inner,
            bucket: TokenBucket::new(bytes_per_second),
            granted: 0,
            delay: None,
            cancelled: Box::pin(cancel.cancelled_owned()),
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ThrottledReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.delay = None;
            return Poll::Ready(Err(Cancelled.into_io()));
        }

        while this.granted == 0 {
            if let Some(delay) = this.delay.as_mut() {
                ready!(delay.as_mut().poll(cx));
                this.delay = None;
            }

            let want = buf.remaining().min(this.bucket.capacity() as usize);
            match this.bucket.try_take(want as u64, Instant::now()) {
                Ok(()) => this.granted = want,
                Err(wait) => this.delay = Some(Box::pin(tokio::time::sleep(wait))),
            }
        }

        // A grant made for an abandoned read may exceed this buffer.
        let take = this.granted.min(buf.remaining());
        let dst = buf.initialize_unfilled_to(take);
        let mut limited = ReadBuf::new(dst);
        let result = ready!(Pin::new(&mut this.inner).poll_read(cx, &mut limited));
        let n = limited.filled().len();
        this.granted -= take;
        result?;

        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

/// Wrap `reader` in a throttle when a ceiling is set; pass it through untouched otherwise.
pub fn throttle<R>(
    reader: R,
    bytes_per_second: Option<NonZeroU64>,
    cancel: CancellationToken,
) -> Box<dyn AsyncRead + Send + Unpin>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    match bytes_per_second {
        Some(rate) => Box::new(ThrottledReader::new(reader, rate, cancel)),
        None => Box::new(reader),
    }
}
