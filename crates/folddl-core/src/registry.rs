use std::path::Path;

use folddl_archive::{Compression, WritePlan};
use once_cell::sync::Lazy;

use crate::error::RegistryError;

/// Identifiers ending in this suffix name tar containers.
pub const ARCHIVE_SUFFIX: &str = ".tar";

/// A named remote archive with its expected size and checksum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    expected_size: u64,
    expected_hash: Option<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_size: 0,
            expected_hash: None,
        }
    }

    /// Total bytes once downloaded or extracted; 0 means unknown.
    pub fn with_expected_size(mut self, bytes: u64) -> Self {
        self.expected_size = bytes;
        self
    }

    /// Lower-case hex SHA-256 of the flat artifact.
    pub fn with_expected_hash(mut self, hash: impl Into<String>) -> Self {
        self.expected_hash = Some(hash.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derived from the identifier so it cannot drift from the object format.
    pub fn is_archive(&self) -> bool {
        self.name.ends_with(ARCHIVE_SUFFIX)
    }

    pub fn expected_size(&self) -> Option<u64> {
        (self.expected_size > 0).then_some(self.expected_size)
    }

    pub fn expected_hash(&self) -> Option<&str> {
        self.expected_hash.as_deref()
    }

    pub fn compression(&self) -> Compression {
        Compression::Zstd
    }

    /// Key of the remote object relative to the store prefix.
    pub fn object_name(&self) -> String {
        format!("{}.{}", self.name, self.compression().extension())
    }

    /// Archives expand into `destination`; flat payloads land at `destination/<name>`.
    pub fn write_plan(&self, destination: &Path) -> WritePlan {
        if self.is_archive() {
            WritePlan::Extract(destination.to_path_buf())
        } else {
            WritePlan::CopyFlat(destination.join(&self.name))
        }
    }
}

/// Fixed catalog of downloadable datasets.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    datasets: Vec<Dataset>,
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::new(vec![
        Dataset::new("mgy_clusters_2022_05.fa"),
        Dataset::new("bfd-first_non_consensus_sequences.fasta"),
        Dataset::new("uniref90_2022_05.fa"),
        Dataset::new("pdb_2022_09_28_mmcif_files.tar"),
        Dataset::new("pdb_seqres_2022_09_28.fasta"),
        Dataset::new("rnacentral_active_seq_id_90_cov_80_linclust.fasta"),
        Dataset::new("nt_rna_2023_02_23_clust_seq_id_90_cov_80_rep_seq.fasta"),
        Dataset::new("rfam_14_9_clust_seq_id_90_cov_80_rep_seq.fasta").with_expected_size(228_433_680),
    ])
});

impl Registry {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    /// The datasets published under the default object store prefix.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn lookup(&self, name: &str) -> Result<&Dataset, RegistryError> {
        self.datasets
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
                known: self.names().join(" "),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.datasets.iter().map(Dataset::name).collect()
    }
}
