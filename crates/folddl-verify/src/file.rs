use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::{HashingReader, Result, Sha256Hasher, VerifyError};

/// Size and lower-case hex SHA-256 of a file, read end to end.
pub fn hash_file(path: &Path) -> Result<(u64, String)> {
    let read_err = |source| VerifyError::Read { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(read_err)?;
    let mut reader = HashingReader::new(BufReader::with_capacity(1 << 20, file), Sha256Hasher::new());
    io::copy(&mut reader, &mut io::sink()).map_err(read_err)?;

    let (bytes, digest) = reader.finish();
    Ok((bytes, hex::encode(digest)))
}

/// Compare a computed hex digest against an expected one, ignoring case.
pub fn verify_hex(expected: &str, actual: &str) -> Result<()> {
    let expected = expected.trim();
    if hex::decode(expected).is_err() {
        return Err(VerifyError::InvalidHex(expected.to_string()));
    }
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected.to_ascii_lowercase(),
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_file_reports_size_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::File::create(&path).unwrap().write_all(b"hello world").unwrap();

        let (size, digest) = hash_file(&path).unwrap();
        assert_eq!(size, 11);
        assert_eq!(digest, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
    }

    #[test]
    fn hash_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = hash_file(&dir.path().join("absent"));
        assert!(matches!(result, Err(VerifyError::Read { .. })));
    }

    #[test]
    fn verify_hex_is_case_insensitive() {
        verify_hex("ABCDEF01", "abcdef01").unwrap();
    }

    #[test]
    fn verify_hex_mismatch() {
        let err = verify_hex("00ff", "ff00").unwrap_err();
        match err {
            VerifyError::Mismatch { expected, actual } => {
                assert_eq!(expected, "00ff");
                assert_eq!(actual, "ff00");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_hex_rejects_garbage() {
        assert!(matches!(verify_hex("not-hex", "00"), Err(VerifyError::InvalidHex(_))));
    }
}
