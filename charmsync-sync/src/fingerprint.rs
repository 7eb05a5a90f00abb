//! SHA-512 content fingerprints for regular files.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha512};

const READ_BUF: usize = 64 * 1024;

/// Hex-encoded SHA-512 digest of a file's full byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Stream `path` through SHA-512.
    ///
    /// Opens `path` with normal (following) semantics; callers only pass
    /// entries already known to be regular files.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Sha512::new();
        let mut buf = vec![0u8; READ_BUF];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Digest of an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_digest_matches_buffer_digest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();
        assert_eq!(
            Fingerprint::of_file(&path).unwrap(),
            Fingerprint::of_bytes(b"hello world")
        );
    }

    #[test]
    fn known_value() {
        let fp = Fingerprint::of_bytes(b"abc");
        assert_eq!(fp.as_hex().len(), 128);
        assert!(fp.as_hex().starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn same_size_different_content_differs() {
        assert_ne!(Fingerprint::of_bytes(b"v1"), Fingerprint::of_bytes(b"v2"));
    }

    #[test]
    fn large_file_spanning_several_reads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.bin");
        let data: Vec<u8> = (0..(READ_BUF * 3 + 17)).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        assert_eq!(
            Fingerprint::of_file(&path).unwrap(),
            Fingerprint::of_bytes(&data)
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = Fingerprint::of_file(&tmp.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
