//! HTTP acquisition and bandwidth throttling for dataset downloads.
//!
//! - [`http`] - the [`HttpClient`] seam and its `reqwest` implementation
//! - [`rate`] - token bucket and the throttled reader built on it
//!
//! Bodies are exposed as byte streams; callers adapt them into readers and
//! decide where the throttle sits in their pipeline.

pub mod http;
pub mod rate;

mod error;

pub use error::{Cancelled, FetchError, Result};
pub use http::{BodyStream, BoxStream, HttpClient, ReqwestClient, cancellable, is_accepted};
pub use rate::{ThrottledReader, TokenBucket, throttle};
pub use reqwest::Url;
