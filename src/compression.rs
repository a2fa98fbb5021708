// src/compression.rs
//! Decompression of repository metadata files
//!
//! Primary metadata is published gzip-, xz- or zstd-compressed depending on
//! the repository generator. The format is taken from the file extension
//! and confirmed against magic bytes.

use std::io::{self, Read};
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to create {format} decoder: {source}")]
    DecoderCreation {
        format: &'static str,
        source: io::Error,
    },

    #[error("Failed to decompress {format} data: {source}")]
    Decompression {
        format: &'static str,
        source: io::Error,
    },
}

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    None,
    Gzip,
    Xz,
    Zstd,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".gz") {
            Self::Gzip
        } else if path.ends_with(".xz") {
            Self::Xz
        } else if path.ends_with(".zst") || path.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Detect compression format from magic bytes
    ///
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zstd: `28 b5 2f fd`
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Self::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decompress a metadata file named `path`
///
/// The extension wins when it names a format; otherwise magic bytes decide,
/// so uncompressed XML passes through unchanged.
pub fn decompress_metadata(path: &str, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let format = match CompressionFormat::from_extension(path) {
        CompressionFormat::None => CompressionFormat::from_magic_bytes(data),
        format => format,
    };
    decompress(data, format)
}

/// Decompress a byte slice using the specified format
pub fn decompress(data: &[u8], format: CompressionFormat) -> Result<Vec<u8>, CompressionError> {
    let mut decoder: Box<dyn Read + '_> = match format {
        CompressionFormat::None => return Ok(data.to_vec()),
        CompressionFormat::Gzip => Box::new(flate2::read::GzDecoder::new(data)),
        CompressionFormat::Xz => Box::new(xz2::read::XzDecoder::new(data)),
        CompressionFormat::Zstd => Box::new(zstd::Decoder::new(data).map_err(|e| {
            CompressionError::DecoderCreation {
                format: "zstd",
                source: e,
            }
        })?),
    };

    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| CompressionError::Decompression {
            format: format.name(),
            source: e,
        })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal gzip of "hello"
    const GZIP_HELLO: &[u8] = &[
        0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xcb, 0x48, 0xcd, 0xc9,
        0xc9, 0x07, 0x00, 0x86, 0xa6, 0x10, 0x36, 0x05, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_format_from_repodata_names() {
        assert_eq!(
            CompressionFormat::from_extension("repodata/abc-primary.xml.gz"),
            CompressionFormat::Gzip
        );
        assert_eq!(
            CompressionFormat::from_extension("repodata/abc-primary.xml.zst"),
            CompressionFormat::Zstd
        );
        assert_eq!(
            CompressionFormat::from_extension("repodata/abc-primary.xml.xz"),
            CompressionFormat::Xz
        );
        assert_eq!(
            CompressionFormat::from_extension("repodata/repomd.xml"),
            CompressionFormat::None
        );
    }

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(CompressionFormat::from_magic_bytes(GZIP_HELLO), CompressionFormat::Gzip);
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x28, 0xb5, 0x2f, 0xfd]),
            CompressionFormat::Zstd
        );
        assert_eq!(CompressionFormat::from_magic_bytes(b"<?xml"), CompressionFormat::None);
        assert_eq!(CompressionFormat::from_magic_bytes(&[0x1f]), CompressionFormat::None);
    }

    #[test]
    fn test_decompress_metadata_by_extension() {
        let result = decompress_metadata("primary.xml.gz", GZIP_HELLO).unwrap();
        assert_eq!(result, b"hello");
    }

    #[test]
    fn test_decompress_metadata_sniffs_magic() {
        let result = decompress_metadata("primary.xml", GZIP_HELLO).unwrap();
        assert_eq!(result, b"hello");

        let plain = decompress_metadata("primary.xml", b"<metadata/>").unwrap();
        assert_eq!(plain, b"<metadata/>");
    }

    #[test]
    fn test_decompress_zstd_roundtrip() {
        let compressed = zstd::encode_all(&b"<metadata/>"[..], 3).unwrap();
        let result = decompress(&compressed, CompressionFormat::Zstd).unwrap();
        assert_eq!(result, b"<metadata/>");
    }

    #[test]
    fn test_decompress_corrupt_gzip() {
        let result = decompress(&[0x1f, 0x8b, 0x00], CompressionFormat::Gzip);
        assert!(result.is_err());
    }
}
