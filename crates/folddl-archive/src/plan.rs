use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Aborted;
use crate::extract::{ExtractReport, copy_flat, extract_tar};
use crate::progress::TransferProgress;

/// How a decompressed stream lands on disk, chosen once per job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WritePlan {
    /// Demultiplex a tar stream into the directory tree rooted here.
    Extract(PathBuf),
    /// Write the stream verbatim to this file.
    CopyFlat(PathBuf),
}

/// What a [`WritePlan`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Materialized {
    Tree(ExtractReport),
    File { bytes: u64 },
}

impl Materialized {
    /// Bytes written by the write stage.
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Tree(report) => report.bytes,
            Self::File { bytes } => *bytes,
        }
    }
}

impl WritePlan {
    /// Directory tree root or destination file.
    pub fn target(&self) -> &Path {
        match self {
            Self::Extract(root) => root,
            Self::CopyFlat(file) => file,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Extract(_))
    }

    /// Drain `reader` onto disk.
    ///
    /// Extraction counts file bytes into `progress` as they are written. A
    /// flat copy leaves it alone; observers watch the file's size instead.
    pub fn materialize<R: Read>(
        &self,
        reader: R,
        progress: &TransferProgress,
    ) -> Result<Materialized, Aborted> {
        match self {
            Self::Extract(root) => extract_tar(reader, root, progress).map(Materialized::Tree),
            Self::CopyFlat(file) => copy_flat(reader, file).map(|bytes| Materialized::File { bytes }),
        }
    }
}
