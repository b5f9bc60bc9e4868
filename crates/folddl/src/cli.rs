use std::path::PathBuf;

use clap::Parser;
use folddl_core::{DEFAULT_BASE_URL, Dataset, Registry};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use url::Url;

use crate::logging::LogFormat;

/// Download one AlphaFold 3 reference dataset into a local directory.
///
/// Every flag can also be given through the environment variable shown.
#[derive(Debug, Parser)]
#[command(name = "folddl", version, about)]
pub struct Cli {
    /// Dataset to download.
    #[arg(long, env = "DATASET", value_parser = parse_dataset, required_unless_present = "list")]
    pub dataset: Option<Dataset>,

    /// Directory the dataset is written or extracted into.
    #[arg(long, env = "DESTINATION", required_unless_present = "list")]
    pub destination: Option<PathBuf>,

    /// Bandwidth ceiling in KiB/s of compressed data; 0 disables the limit.
    #[arg(long, env = "RATE", default_value_t = 0)]
    pub rate: u64,

    /// Object store prefix the datasets are published under.
    #[arg(long, env = "FOLDDL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    #[arg(long, env = "FOLDDL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Print the known datasets and exit.
    #[arg(long)]
    pub list: bool,
}

fn parse_dataset(name: &str) -> Result<Dataset, String> {
    Registry::builtin()
        .lookup(name)
        .cloned()
        .map_err(|err| err.to_string())
}

#[derive(Tabled)]
struct DatasetRow {
    name: String,
    #[tabled(rename = "type")]
    kind: &'static str,
    #[tabled(rename = "expected bytes")]
    size: String,
}

/// Table of the built-in datasets.
pub fn dataset_table() -> String {
    let rows = Registry::builtin().iter().map(|d| DatasetRow {
        name: d.name().to_string(),
        kind: if d.is_archive() { "tar archive" } else { "file" },
        size: d.expected_size().map_or_else(|| "unknown".to_string(), |s| s.to_string()),
    });
    let mut table = Table::new(rows);
    table.with(Style::blank());
    table.to_string()
}
