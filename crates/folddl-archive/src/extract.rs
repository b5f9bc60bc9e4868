use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Aborted, Error, Result};
use crate::progress::{ProgressWriter, TransferProgress};
use crate::sanitize::sanitize_entry_path;

const COPY_BUFFER: usize = 256 * 1024;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Outcome of demultiplexing one tar stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub entries: usize,
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Demultiplex a tar stream into `root`, counting file bytes into `progress`.
///
/// Entries are handled in stream order. Directories are created with their
/// ancestors; regular files are created or truncated with the entry's
/// permission bits and receive exactly the entry's declared length. A second
/// regular entry for the same path is fatal. Links and special entries are
/// skipped.
pub fn extract_tar<R: Read>(
    reader: R,
    root: &Path,
    progress: &TransferProgress,
) -> std::result::Result<ExtractReport, Aborted> {
    let mut report = ExtractReport::default();
    match unpack(reader, root, progress, &mut report) {
        Ok(()) => Ok(report),
        Err(source) => Err(Aborted { written: report.bytes, source }),
    }
}

fn unpack<R: Read>(
    reader: R,
    root: &Path,
    progress: &TransferProgress,
    report: &mut ExtractReport,
) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    let mut buf = vec![0u8; COPY_BUFFER];
    let mut written = HashSet::new();

    for entry in archive.entries().map_err(Error::Stream)? {
        let mut entry = entry.map_err(Error::Stream)?;
        unpack_entry(&mut entry, root, progress, report, &mut written, &mut buf)?;
        report.entries += 1;
    }

    Ok(())
}

fn unpack_entry<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    root: &Path,
    progress: &TransferProgress,
    report: &mut ExtractReport,
    written: &mut HashSet<PathBuf>,
    buf: &mut [u8],
) -> Result<()> {
    let name = entry.path().map_err(Error::Stream)?.into_owned();
    let target = sanitize_entry_path(&name, root)?;
    let entry_type = entry.header().entry_type();

    if entry_type.is_dir() {
        fs::create_dir_all(&target)
            .map_err(|source| Error::DirectoryCreationFailed { path: target.clone(), source })?;
        report.directories += 1;
        return Ok(());
    }

    if !entry_type.is_file() {
        debug!(entry = %name.display(), kind = ?entry_type, "skipping non-regular entry");
        report.skipped += 1;
        return Ok(());
    }

    if target == root {
        return Err(Error::InvalidPath { entry: name });
    }
    // A repeat would truncate bytes already counted into `progress`.
    if !written.insert(target.clone()) {
        return Err(Error::DuplicateEntry { entry: name });
    }

    let expected = entry.size();
    let mode = entry.header().mode().unwrap_or(DEFAULT_FILE_MODE) & 0o7777;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| Error::DirectoryCreationFailed { path: parent.to_path_buf(), source })?;
    }

    let file = create_truncated(&target, mode)
        .map_err(|source| Error::ExtractionFailed { path: target.clone(), source })?;
    let mut writer = ProgressWriter::new(file, progress.clone());

    let before = report.bytes;
    copy_counted(entry, &mut writer, &target, &mut report.bytes, buf)?;
    let actual = report.bytes - before;

    if actual != expected {
        return Err(Error::Truncated { path: target, expected, actual });
    }

    debug!(entry = %name.display(), size = actual, "extracted file");
    report.files += 1;
    Ok(())
}

/// Copy a whole stream into a single file at `path`, creating or truncating it.
///
/// Returns the number of bytes written.
pub fn copy_flat<R: Read>(mut reader: R, path: &Path) -> std::result::Result<u64, Aborted> {
    let mut written = 0u64;
    let result = File::create(path)
        .map_err(|source| Error::ExtractionFailed { path: path.to_path_buf(), source })
        .and_then(|mut file| {
            let mut buf = vec![0u8; COPY_BUFFER];
            copy_counted(&mut reader, &mut file, path, &mut written, &mut buf)?;
            file.sync_all()
                .map_err(|source| Error::ExtractionFailed { path: path.to_path_buf(), source })
        });

    match result {
        Ok(()) => Ok(written),
        Err(source) => Err(Aborted { written, source }),
    }
}

fn copy_counted<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    path: &Path,
    written: &mut u64,
    buf: &mut [u8],
) -> Result<()> {
    loop {
        let n = reader.read(buf).map_err(Error::Stream)?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .map_err(|source| Error::ExtractionFailed { path: path.to_path_buf(), source })?;
        *written += n as u64;
    }
    writer
        .flush()
        .map_err(|source| Error::ExtractionFailed { path: path.to_path_buf(), source })
}

/// `mode` is set at creation and reapplied when an existing file is reused.
#[cfg(unix)]
fn create_truncated(path: &Path, mode: u32) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let existed = fs::symlink_metadata(path).is_ok();
    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(mode).open(path)?;
    if existed {
        file.set_permissions(fs::Permissions::from_mode(mode))?;
    }
    Ok(file)
}

#[cfg(not(unix))]
fn create_truncated(path: &Path, _mode: u32) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}
