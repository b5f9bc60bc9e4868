use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt, future, stream};
use reqwest::{StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::error::{Cancelled, FetchError, Result};

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response body with transport errors already mapped to [`io::Error`].
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Asynchronous HTTP client abstraction.
///
/// Implementations issue a single plain GET, reject any status other than
/// `200 OK` and `206 Partial Content`, and hand back the body as a stream.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url) -> impl Future<Output = Result<BodyStream>> + Send;
}

/// Statuses that count as a successful fetch.
pub fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT
}

/// Stop yielding chunks once `cancel` fires and end the body with a
/// [`Cancelled`] error, so readers downstream never mistake it for EOF.
pub fn cancellable(body: BodyStream, cancel: CancellationToken) -> BodyStream {
    let tail = cancel.clone();
    let trailer = stream::once(async move { tail.is_cancelled() })
        .filter_map(|cancelled| future::ready(cancelled.then(|| Err(Cancelled.into_io()))));
    Box::pin(body.take_until(cancel.cancelled_owned()).chain(trailer))
}

/// Production HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// `timeout` bounds the whole request, body included.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<BodyStream> {
        tracing::debug!(%url, "sending request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let status = response.status();
        if !is_accepted(status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        tracing::debug!(%url, status = status.as_u16(), length = ?response.content_length(), "response accepted");
        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellable_passes_chunks_through() {
        let body: BodyStream = Box::pin(stream::iter([
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"def")),
        ]));
        let chunks: Vec<_> = cancellable(body, CancellationToken::new()).collect().await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.is_ok()));
    }

    #[tokio::test]
    async fn cancellable_ends_with_cancelled_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let body: BodyStream = Box::pin(stream::pending());

        let chunks: Vec<_> = cancellable(body, cancel).collect().await;
        assert_eq!(chunks.len(), 1);
        let err = chunks.into_iter().next().unwrap().unwrap_err();
        assert!(Cancelled::is_cause_of(&err));
    }

    #[test]
    fn only_ok_and_partial_content_are_accepted() {
        assert!(is_accepted(StatusCode::OK));
        assert!(is_accepted(StatusCode::PARTIAL_CONTENT));
        assert!(!is_accepted(StatusCode::NO_CONTENT));
        assert!(!is_accepted(StatusCode::FOUND));
        assert!(!is_accepted(StatusCode::NOT_FOUND));
        assert!(!is_accepted(StatusCode::SERVICE_UNAVAILABLE));
    }
}
