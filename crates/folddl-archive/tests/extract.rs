use std::fs;
use std::path::Path;

use folddl_archive::{
    Compression, Error, ExtractReport, Materialized, TransferProgress, WritePlan, copy_flat,
    extract_tar,
};

fn tar_builder() -> tar::Builder<Vec<u8>> {
    tar::Builder::new(Vec::new())
}

fn add_dir(builder: &mut tar::Builder<Vec<u8>>, name: &str) {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, name, &[][..]).unwrap();
}

fn add_file(builder: &mut tar::Builder<Vec<u8>>, name: &str, mode: u32, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_cksum();
    builder.append_data(&mut header, name, data).unwrap();
}

/// Writes the name straight into the header, bypassing the builder's own path checks.
fn add_raw_file(builder: &mut tar::Builder<Vec<u8>>, name: &[u8], data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, data).unwrap();
}

fn patterned(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

fn tree_size(root: &Path) -> u64 {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.metadata().unwrap().len())
        .sum()
}

#[test]
fn extracts_directories_and_files_byte_for_byte() {
    let small = patterned(100, 1);
    let large = patterned(200, 2);

    let mut builder = tar_builder();
    add_dir(&mut builder, "mmcif_files/");
    add_file(&mut builder, "mmcif_files/1abc.cif", 0o644, &small);
    add_file(&mut builder, "mmcif_files/nested/2xyz.cif", 0o644, &large);
    let archive = builder.into_inner().unwrap();

    let dest = tempfile::tempdir().unwrap();
    let progress = TransferProgress::new();
    let report = extract_tar(&archive[..], dest.path(), &progress).unwrap();

    assert_eq!(
        report,
        ExtractReport { entries: 3, files: 2, directories: 1, skipped: 0, bytes: 300 }
    );
    assert_eq!(progress.load(), 300);
    assert_eq!(fs::read(dest.path().join("mmcif_files/1abc.cif")).unwrap(), small);
    assert_eq!(fs::read(dest.path().join("mmcif_files/nested/2xyz.cif")).unwrap(), large);
    assert_eq!(tree_size(dest.path()), 300);
}

#[test]
fn existing_files_are_truncated_not_appended() {
    let dest = tempfile::tempdir().unwrap();
    fs::write(dest.path().join("a.txt"), vec![b'x'; 1000]).unwrap();

    let mut builder = tar_builder();
    add_file(&mut builder, "a.txt", 0o644, b"fresh");
    let archive = builder.into_inner().unwrap();

    extract_tar(&archive[..], dest.path(), &TransferProgress::new()).unwrap();
    assert_eq!(fs::read(dest.path().join("a.txt")).unwrap(), b"fresh");
}

#[test]
fn repeated_file_entry_is_fatal() {
    let mut builder = tar_builder();
    add_file(&mut builder, "a.txt", 0o644, &patterned(100, 8));
    add_file(&mut builder, "./a.txt", 0o644, &patterned(100, 9));
    let archive = builder.into_inner().unwrap();

    let dest = tempfile::tempdir().unwrap();
    let progress = TransferProgress::new();
    let err = extract_tar(&archive[..], dest.path(), &progress).unwrap_err();

    assert!(matches!(err.source, Error::DuplicateEntry { .. }), "{err}");
    assert_eq!(err.written, 100);
    assert_eq!(fs::read(dest.path().join("a.txt")).unwrap(), patterned(100, 8));
    assert!(progress.load() <= tree_size(dest.path()));
}

#[test]
fn parent_segments_escaping_the_root_are_fatal() {
    let outer = tempfile::tempdir().unwrap();
    let dest = outer.path().join("dest");
    fs::create_dir(&dest).unwrap();

    let mut builder = tar_builder();
    add_file(&mut builder, "ok.txt", 0o644, b"fine");
    add_raw_file(&mut builder, b"../evil.txt", b"gotcha");
    let archive = builder.into_inner().unwrap();

    let err = extract_tar(&archive[..], &dest, &TransferProgress::new()).unwrap_err();
    assert!(matches!(err.source, Error::PathTraversal { .. }), "{err}");
    assert_eq!(err.written, 4);
    assert!(!outer.path().join("evil.txt").exists());
}

#[test]
fn absolute_entry_names_are_fatal() {
    let dest = tempfile::tempdir().unwrap();

    let mut builder = tar_builder();
    add_raw_file(&mut builder, b"/tmp/folddl-absolute-entry", b"gotcha");
    let archive = builder.into_inner().unwrap();

    let err = extract_tar(&archive[..], dest.path(), &TransferProgress::new()).unwrap_err();
    assert!(matches!(err.source, Error::PathTraversal { .. }), "{err}");
}

#[test]
fn truncated_entry_reports_partial_size() {
    let data = patterned(200, 3);
    let mut builder = tar_builder();
    add_file(&mut builder, "cut.bin", 0o644, &data);
    let archive = builder.into_inner().unwrap();
    let truncated = &archive[..512 + 100];

    let dest = tempfile::tempdir().unwrap();
    let progress = TransferProgress::new();
    let err = extract_tar(truncated, dest.path(), &progress).unwrap_err();

    assert!(
        matches!(err.source, Error::Truncated { expected: 200, actual: 100, .. }),
        "{err}"
    );
    assert_eq!(err.written, 100);
    assert_eq!(progress.load(), 100);
}

#[test]
fn links_are_skipped() {
    let mut builder = tar_builder();
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_size(0);
    header.set_mode(0o777);
    header.set_link_name("../../outside").unwrap();
    header.set_cksum();
    builder.append_data(&mut header, "link", &[][..]).unwrap();
    add_file(&mut builder, "real.txt", 0o644, b"data");
    let archive = builder.into_inner().unwrap();

    let dest = tempfile::tempdir().unwrap();
    let report = extract_tar(&archive[..], dest.path(), &TransferProgress::new()).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.files, 1);
    assert!(fs::symlink_metadata(dest.path().join("link")).is_err());
}

#[cfg(unix)]
#[test]
fn file_permission_bits_are_applied() {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tar_builder();
    add_file(&mut builder, "bin/run.sh", 0o700, b"#!/bin/sh\n");
    let archive = builder.into_inner().unwrap();

    let dest = tempfile::tempdir().unwrap();
    extract_tar(&archive[..], dest.path(), &TransferProgress::new()).unwrap();

    let mode = fs::metadata(dest.path().join("bin/run.sh")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[cfg(unix)]
#[test]
fn existing_file_takes_the_entry_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dest = tempfile::tempdir().unwrap();
    let path = dest.path().join("run.sh");
    fs::write(&path, b"old").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

    let mut builder = tar_builder();
    add_file(&mut builder, "run.sh", 0o755, b"#!/bin/sh\n");
    let archive = builder.into_inner().unwrap();

    extract_tar(&archive[..], dest.path(), &TransferProgress::new()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert_eq!(fs::read(&path).unwrap(), b"#!/bin/sh\n");
}

#[test]
fn flat_copy_writes_the_whole_stream() {
    let data = patterned(1000, 4);
    let dest = tempfile::tempdir().unwrap();
    let path = dest.path().join("X");

    let written = copy_flat(&data[..], &path).unwrap();
    assert_eq!(written, 1000);
    assert_eq!(fs::read(&path).unwrap(), data);
}

#[test]
fn flat_copy_into_missing_directory_fails_with_context() {
    let dest = tempfile::tempdir().unwrap();
    let path = dest.path().join("missing").join("X");

    let err = copy_flat(&b"abc"[..], &path).unwrap_err();
    assert!(matches!(err.source, Error::ExtractionFailed { .. }));
    assert_eq!(err.written, 0);
}

#[test]
fn write_plan_drives_zstd_compressed_tar() {
    let mut builder = tar_builder();
    add_dir(&mut builder, "d/");
    add_file(&mut builder, "d/f1", 0o644, &patterned(100, 5));
    add_file(&mut builder, "d/f2", 0o644, &patterned(200, 6));
    let compressed = zstd::encode_all(&builder.into_inner().unwrap()[..], 3).unwrap();

    let dest = tempfile::tempdir().unwrap();
    let plan = WritePlan::Extract(dest.path().to_path_buf());
    let progress = TransferProgress::new();

    let decoder = Compression::Zstd.decoder(&compressed[..]).unwrap();
    let outcome = plan.materialize(decoder, &progress).unwrap();

    assert!(matches!(outcome, Materialized::Tree(ref r) if r.files == 2));
    assert_eq!(outcome.bytes(), 300);
    assert_eq!(tree_size(dest.path()), 300);
}

#[test]
fn write_plan_copies_flat_payload() {
    let payload = patterned(4096, 7);
    let compressed = zstd::encode_all(&payload[..], 3).unwrap();

    let dest = tempfile::tempdir().unwrap();
    let plan = WritePlan::CopyFlat(dest.path().join("uniref90.fa"));
    let progress = TransferProgress::new();

    let decoder = Compression::Zstd.decoder(&compressed[..]).unwrap();
    let outcome = plan.materialize(decoder, &progress).unwrap();

    assert_eq!(outcome, Materialized::File { bytes: 4096 });
    assert_eq!(progress.load(), 0);
    assert_eq!(fs::read(plan.target()).unwrap(), payload);
}

#[test]
fn corrupt_compressed_stream_aborts_extraction() {
    let dest = tempfile::tempdir().unwrap();
    let plan = WritePlan::Extract(dest.path().to_path_buf());

    let decoder = Compression::Zstd.decoder(&b"\x28\xb5\x2f\xfdgarbage-after-magic"[..]).unwrap();
    let err = plan.materialize(decoder, &TransferProgress::new()).unwrap_err();
    assert!(matches!(err.source, Error::Stream(_)), "{err}");
}
