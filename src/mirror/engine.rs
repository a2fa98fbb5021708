// src/mirror/engine.rs

//! Transfer engine interface
//!
//! The orchestrator never talks to the network itself. It hands each
//! repository to a [`MirrorEngine`] and treats a returned [`MirrorError`] as a
//! per-repository failure.

use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Failure raised by a transfer engine for one repository or product tree
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Fetching a remote file failed
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// A downloaded file did not match its published checksum
    #[error("Checksum verification failed for {path}: {reason}")]
    Checksum { path: String, reason: String },

    /// Repository metadata could not be parsed or is inconsistent
    #[error("Invalid repository metadata: {0}")]
    Metadata(String),

    /// The repository URL cannot be mapped to a local path
    #[error("Invalid repository URL {0}")]
    InvalidUrl(String),

    /// Local filesystem failure while staging or storing content
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Performs the actual content transfer for a single repository
pub trait MirrorEngine {
    /// Mirror the repository at `url` into `local_path` under the mirror root
    fn mirror(
        &self,
        url: &str,
        local_path: &Path,
        auth_token: Option<&str>,
        name: &str,
    ) -> Result<(), MirrorError>;

    /// Mirror the upstream product tree published at `url`
    fn mirror_product_tree(&self, url: &str) -> Result<(), MirrorError>;
}

/// Derive the local storage path for a repository URL
///
/// The path is the URL path with empty, `.` and `..` segments dropped, so the
/// same URL always lands in the same directory and never escapes the mirror
/// root. A URL without a path maps to `/`.
pub fn local_path_for_url(url: &str) -> Result<PathBuf, MirrorError> {
    let parsed = Url::parse(url).map_err(|e| MirrorError::InvalidUrl(format!("{url}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(MirrorError::InvalidUrl(url.to_string()));
    }

    let mut path = PathBuf::from("/");
    for segment in parsed.path().split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        path.push(segment);
    }
    Ok(path)
}

/// Join a local path produced by [`local_path_for_url`] onto a mirror root
pub fn resolve_under(root: &Path, local_path: &Path) -> PathBuf {
    root.join(local_path.strip_prefix("/").unwrap_or(local_path))
}
