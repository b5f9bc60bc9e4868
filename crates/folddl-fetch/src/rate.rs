//! Bandwidth limiting.

pub mod bucket;
pub mod throttled;

pub use bucket::TokenBucket;
pub use throttled::{ThrottledReader, throttle};
