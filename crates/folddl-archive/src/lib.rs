//! Streaming decompression and tar extraction with path sanitization.
//!
//! # Architecture
//!
//! - `codec.rs` - Decompression stage wrapped around the transfer stream
//! - `sanitize.rs` - Path sanitization (path traversal prevention)
//! - `extract.rs` - Tar demultiplexing and flat-file copy
//! - `plan.rs` - [`WritePlan`], the per-job choice between the two
//! - `progress.rs` - [`TransferProgress`], the byte counter shared with observers

pub use codec::{Compression, Decoder};
pub use error::{Aborted, Error, Result};
pub use extract::{ExtractReport, copy_flat, extract_tar};
pub use plan::{Materialized, WritePlan};
pub use progress::{ProgressWriter, TransferProgress};
pub use sanitize::sanitize_entry_path;

mod codec;
mod error;
mod extract;
mod plan;
mod progress;
mod sanitize;
