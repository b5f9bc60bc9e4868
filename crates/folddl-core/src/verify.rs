use std::fs;
use std::path::Path;

use folddl_verify::{hash_file, verify_hex};
use tracing::warn;

use crate::error::{DownloadError, Result};
use crate::registry::Dataset;

/// What verification established about a finished artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    pub size: u64,
    pub hash: Option<String>,
}

fn check_size(path: &Path, expected: Option<u64>, actual: u64) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(DownloadError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Re-read a flat artifact end to end and check it against `dataset`.
///
/// With no expected hash the digest is informational, and failing to compute
/// it only costs the hash in the result.
pub fn verify_file(path: &Path, dataset: &Dataset) -> Result<Verification> {
    match hash_file(path) {
        Ok((size, hash)) => {
            check_size(path, dataset.expected_size(), size)?;
            if let Some(expected) = dataset.expected_hash() {
                verify_hex(expected, &hash).map_err(|source| DownloadError::Verify {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Ok(Verification { size, hash: Some(hash) })
        }
        Err(source) if dataset.expected_hash().is_none() => {
            warn!(path = %path.display(), error = %source, "could not hash downloaded file");
            let size = fs::metadata(path)
                .map_err(|source| DownloadError::Inspect { path: path.to_path_buf(), source })?
                .len();
            check_size(path, dataset.expected_size(), size)?;
            Ok(Verification { size, hash: None })
        }
        Err(source) => Err(DownloadError::Verify { path: path.to_path_buf(), source }),
    }
}

/// Check the bytes extracted under `root` against `dataset`. Trees are not hashed.
pub fn verify_tree(root: &Path, dataset: &Dataset, extracted: u64) -> Result<Verification> {
    check_size(root, dataset.expected_size(), extracted)?;
    Ok(Verification { size: extracted, hash: None })
}
