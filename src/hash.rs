// src/hash.rs

//! Checksum verification for mirrored files
//!
//! RPM-MD metadata publishes a checksum type next to every file it
//! references. Only the SHA-2 family is accepted; legacy `sha`/`sha1`/`md5`
//! entries are reported as unsupported rather than silently trusted.

use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumType {
    #[default]
    Sha256,
    Sha512,
}

impl ChecksumType {
    /// Get the algorithm name as it appears in repodata
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Get the digest length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChecksumType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(format!("unsupported checksum type: {s}")),
        }
    }
}

/// An expected checksum from repository metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub kind: ChecksumType,
    pub value: String,
}

impl Checksum {
    pub fn new(kind: ChecksumType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into().trim().to_lowercase(),
        }
    }
}

/// Checksum verification failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub expected: String,
    pub actual: String,
    pub kind: ChecksumType,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: expected {}, got {}",
            self.kind, self.expected, self.actual
        )
    }
}

impl std::error::Error for VerifyError {}

/// Compute the hex digest of everything `reader` yields
pub fn hash_reader<R: Read>(kind: ChecksumType, reader: &mut R) -> io::Result<String> {
    let mut buffer = [0u8; 8192];

    macro_rules! digest {
        ($hasher:expr) => {{
            let mut hasher = $hasher;
            loop {
                let n = reader.read(&mut buffer)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
            }
            format!("{:x}", hasher.finalize())
        }};
    }

    Ok(match kind {
        ChecksumType::Sha256 => digest!(Sha256::new()),
        ChecksumType::Sha512 => digest!(Sha512::new()),
    })
}

/// Compute the hex digest of a byte slice
pub fn hash_bytes(kind: ChecksumType, mut data: &[u8]) -> String {
    // reading from a slice cannot fail
    hash_reader(kind, &mut data).unwrap_or_default()
}

/// Verify a file matches an expected checksum
///
/// Streams the file content to avoid loading it entirely into memory.
pub fn verify_file(path: &Path, expected: &Checksum) -> Result<(), VerifyError> {
    let mismatch = |actual: &str| VerifyError {
        expected: expected.value.clone(),
        actual: actual.to_string(),
        kind: expected.kind,
    };

    let mut file = std::fs::File::open(path).map_err(|_| mismatch("<file read error>"))?;
    let actual = hash_reader(expected.kind, &mut file).map_err(|_| mismatch("<hash read error>"))?;

    if actual == expected.value {
        Ok(())
    } else {
        Err(mismatch(&actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            hash_bytes(ChecksumType::Sha256, b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha512_length() {
        let digest = hash_bytes(ChecksumType::Sha512, b"hello world");
        assert_eq!(digest.len(), ChecksumType::Sha512.hex_len());
    }

    #[test]
    fn test_checksum_type_parse() {
        assert_eq!("sha256".parse::<ChecksumType>(), Ok(ChecksumType::Sha256));
        assert_eq!("SHA512".parse::<ChecksumType>(), Ok(ChecksumType::Sha512));
        assert!("sha".parse::<ChecksumType>().is_err());
        assert!("md5".parse::<ChecksumType>().is_err());
    }

    #[test]
    fn test_verify_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let good = Checksum::new(
            ChecksumType::Sha256,
            "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9",
        );
        assert!(verify_file(file.path(), &good).is_ok());

        let bad = Checksum::new(ChecksumType::Sha256, "00");
        let err = verify_file(file.path(), &bad).unwrap_err();
        assert_eq!(err.expected, "00");
        assert_eq!(err.actual.len(), 64);
    }

    #[test]
    fn test_verify_missing_file() {
        let checksum = Checksum::new(ChecksumType::Sha256, "00");
        let err = verify_file(Path::new("/nonexistent/file.rpm"), &checksum).unwrap_err();
        assert_eq!(err.actual, "<file read error>");
    }
}
