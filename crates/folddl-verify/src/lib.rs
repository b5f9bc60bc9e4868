//! Content verification primitives for downloaded datasets.
//!
//! Hashing is incremental: a [`Hasher`] is fed bytes as they stream past a
//! [`HashingReader`], so a completed artifact is read exactly once to produce
//! its digest. Comparison against an expected digest is a separate step so
//! callers decide whether a mismatch is fatal or only worth logging.
//!
//! # Example
//!
//! ```
//! use folddl_verify::{Hasher, HashingReader, Sha256Hasher};
//!
//! let mut reader = HashingReader::new(&b"hello world"[..], Sha256Hasher::new());
//! std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
//!
//! let (_, digest) = reader.finish();
//! assert_eq!(digest, Sha256Hasher::digest(b"hello world"));
//! ```

pub use self::error::{Result, VerifyError};
pub use self::file::{hash_file, verify_hex};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::reader::HashingReader;

mod error;
mod file;
mod hasher;
mod reader;
