use std::fs;
use std::io;
use std::path::Path;

use folddl_archive::WritePlan;
use walkdir::WalkDir;

/// Sum of the sizes of every non-directory entry under `root`.
pub fn tree_size(root: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        total += entry.metadata()?.len();
    }
    Ok(total)
}

/// State of a destination before a job runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Existing {
    Absent,
    /// Present and exactly the expected size.
    Complete(u64),
    /// Present, but the size differs or nothing is expected.
    Stale(u64),
}

/// Measure what `plan` would write over. An unknown expected size never
/// makes a destination complete.
pub fn inspect_existing(plan: &WritePlan, expected: Option<u64>) -> io::Result<Existing> {
    let size = match plan {
        WritePlan::Extract(root) => {
            if !root.try_exists()? {
                return Ok(Existing::Absent);
            }
            tree_size(root)?
        }
        WritePlan::CopyFlat(file) => match fs::metadata(file) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Existing::Absent),
            Err(err) => return Err(err),
        },
    };

    Ok(match expected {
        Some(expected) if expected == size => Existing::Complete(size),
        _ => Existing::Stale(size),
    })
}
