// src/mirror/http.rs

//! HTTP transfer engine for RPM-MD repositories
//!
//! Mirrors a repository in three phases:
//! - fetch `repodata/repomd.xml` and every metadata file it lists into a
//!   staging directory, verifying checksums
//! - download packages named in the primary metadata, skipping files that
//!   are already present with the right checksum
//! - swap the staged `repodata/` into place
//!
//! Packages land before the metadata that references them, so clients
//! never see metadata pointing at missing files.

use crate::compression::decompress_metadata;
use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::hash::{self, Checksum};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::engine::{MirrorEngine, MirrorError, resolve_under};
use super::repodata::{self, RepomdEntry};

/// Retry delay in milliseconds (multiplied by the attempt number)
const RETRY_DELAY_MS: u64 = 1000;

/// Directory under the mirror root that receives the product tree
pub const PRODUCT_TREE_DIR: &str = "product_tree";

/// File name of the product tree document
pub const PRODUCT_TREE_FILE: &str = "product_tree.json";

/// Mirror engine backed by a blocking reqwest client
pub struct HttpMirrorEngine {
    client: Client,
    root: PathBuf,
    mirror_src: bool,
    max_retries: u32,
}

impl HttpMirrorEngine {
    /// Create an engine writing below the configured mirror root
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(concat!("conary-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            root: config.mirror.root.clone(),
            mirror_src: config.mirror.mirror_src,
            max_retries: config.http.max_retries.max(1),
        })
    }

    /// Mirror root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Download `url` to `dest`, retrying transport errors
    ///
    /// Returns `Ok(false)` for a 404 when `optional` is set.
    fn fetch(&self, url: &str, dest: &Path, optional: bool) -> std::result::Result<bool, MirrorError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let download_error = |reason: String| MirrorError::Download {
            url: redact(url),
            reason,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(mut response) => {
                    let status = response.status();
                    if optional && status == StatusCode::NOT_FOUND {
                        debug!("Optional file {} not present upstream", redact(url));
                        return Ok(false);
                    }
                    if !status.is_success() {
                        return Err(download_error(format!("HTTP {status}")));
                    }

                    // Write to temporary file first
                    let mut temp_path = dest.as_os_str().to_owned();
                    temp_path.push(".part");
                    let temp_path = PathBuf::from(temp_path);
                    let mut file = File::create(&temp_path)?;
                    if let Err(e) = io::copy(&mut response, &mut file) {
                        let _ = fs::remove_file(&temp_path);
                        return Err(download_error(scrub(
                            format!("failed to write data: {e}"),
                            url,
                        )));
                    }
                    fs::rename(&temp_path, dest)?;

                    debug!("Downloaded {}", dest.display());
                    return Ok(true);
                }
                Err(e) => {
                    let e = e.without_url();
                    if attempt >= self.max_retries {
                        return Err(download_error(format!(
                            "giving up after {attempt} attempts: {e}"
                        )));
                    }
                    warn!(
                        "Download of {} failed (attempt {}): {}, retrying...",
                        redact(url),
                        attempt,
                        e
                    );
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    /// Download `relative` from `base` into `dir` and verify it
    fn fetch_verified(
        &self,
        base: &str,
        relative: &str,
        dir: &Path,
        checksum: &Checksum,
        auth_token: Option<&str>,
    ) -> std::result::Result<PathBuf, MirrorError> {
        let dest = safe_join(dir, relative)?;
        let url = with_token(&format!("{base}{relative}"), auth_token);
        self.fetch(&url, &dest, false)?;
        verify(&dest, checksum)?;
        Ok(dest)
    }

    fn fetch_metadata(
        &self,
        base: &str,
        staging: &Path,
        auth_token: Option<&str>,
    ) -> std::result::Result<Vec<RepomdEntry>, MirrorError> {
        let repomd_path = staging.join("repodata/repomd.xml");
        self.fetch(
            &with_token(&format!("{base}repodata/repomd.xml"), auth_token),
            &repomd_path,
            false,
        )?;

        // Signature and key are published by signed repositories only
        for extra in ["repodata/repomd.xml.asc", "repodata/repomd.xml.key"] {
            self.fetch(
                &with_token(&format!("{base}{extra}"), auth_token),
                &staging.join(extra),
                true,
            )?;
        }

        let entries = repodata::parse_repomd(&fs::read_to_string(&repomd_path)?)?;
        for entry in &entries {
            self.fetch_verified(base, &entry.location, staging, &entry.checksum, auth_token)?;
        }
        Ok(entries)
    }

    fn fetch_packages(
        &self,
        base: &str,
        dest: &Path,
        staging: &Path,
        entries: &[RepomdEntry],
        auth_token: Option<&str>,
    ) -> std::result::Result<usize, MirrorError> {
        let primary = entries
            .iter()
            .find(|e| e.data_type == "primary")
            .ok_or_else(|| MirrorError::Metadata("repomd.xml has no primary metadata".to_string()))?;

        let raw = fs::read(safe_join(staging, &primary.location)?)?;
        let xml = decompress_metadata(&primary.location, &raw)
            .map_err(|e| MirrorError::Metadata(e.to_string()))?;
        let packages = repodata::parse_primary(&String::from_utf8_lossy(&xml))?;

        let mut downloaded = 0;
        for package in packages.iter().filter(|p| self.mirror_src || !p.is_source()) {
            let target = safe_join(dest, &package.location)?;
            if target.exists() && hash::verify_file(&target, &package.checksum).is_ok() {
                debug!("Package {} already mirrored", package.location);
                continue;
            }
            self.fetch_verified(base, &package.location, dest, &package.checksum, auth_token)?;
            downloaded += 1;
        }
        Ok(downloaded)
    }
}

impl MirrorEngine for HttpMirrorEngine {
    fn mirror(
        &self,
        url: &str,
        local_path: &Path,
        auth_token: Option<&str>,
        name: &str,
    ) -> std::result::Result<(), MirrorError> {
        let base = with_trailing_slash(url);
        let dest = resolve_under(&self.root, local_path);
        info!("Mirroring repository {} to {}", name, dest.display());

        fs::create_dir_all(&dest)?;
        let staging = tempfile::Builder::new()
            .prefix(".repodata-")
            .tempdir_in(&dest)?;

        let entries = self.fetch_metadata(&base, staging.path(), auth_token)?;
        let downloaded = self.fetch_packages(&base, &dest, staging.path(), &entries, auth_token)?;

        swap_dir(&staging.path().join("repodata"), &dest.join("repodata"))?;

        info!(
            "Mirrored {} ({} metadata files, {} new packages)",
            name,
            entries.len(),
            downloaded
        );
        Ok(())
    }

    fn mirror_product_tree(&self, url: &str) -> std::result::Result<(), MirrorError> {
        let base = with_trailing_slash(url);
        let dest = self.root.join(PRODUCT_TREE_DIR).join(PRODUCT_TREE_FILE);
        info!("Mirroring product tree from {}", base);

        let staged = dest.with_extension("json.new");
        self.fetch(&format!("{base}{PRODUCT_TREE_FILE}"), &staged, false)?;

        let contents = fs::read(&staged)?;
        if let Err(e) = serde_json::from_slice::<serde_json::Value>(&contents) {
            let _ = fs::remove_file(&staged);
            return Err(MirrorError::Metadata(format!("{PRODUCT_TREE_FILE}: {e}")));
        }

        fs::rename(&staged, &dest)?;
        Ok(())
    }
}

/// Move `staged` into place at `live`
///
/// The old directory is parked next to `live` until the new one is in
/// place, and put back if that rename fails.
fn swap_dir(staged: &Path, live: &Path) -> io::Result<()> {
    if !live.exists() {
        return fs::rename(staged, live);
    }

    let mut backup_name = std::ffi::OsString::from(".");
    backup_name.push(live.file_name().unwrap_or(live.as_os_str()));
    backup_name.push(".old");
    let backup = live.with_file_name(backup_name);
    if backup.exists() {
        fs::remove_dir_all(&backup)?;
    }

    fs::rename(live, &backup)?;
    if let Err(e) = fs::rename(staged, live) {
        if let Err(restore) = fs::rename(&backup, live) {
            warn!("Failed to restore {}: {}", live.display(), restore);
        }
        return Err(e);
    }

    if let Err(e) = fs::remove_dir_all(&backup) {
        warn!("Failed to remove {}: {}", backup.display(), e);
    }
    Ok(())
}

fn verify(path: &Path, checksum: &Checksum) -> std::result::Result<(), MirrorError> {
    hash::verify_file(path, checksum).map_err(|e| {
        let _ = fs::remove_file(path);
        MirrorError::Checksum {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Append the repository token as the request query
fn with_token(url: &str, auth_token: Option<&str>) -> String {
    match auth_token.map(|t| t.trim_start_matches('?')) {
        Some(token) if !token.is_empty() => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{token}")
        }
        _ => url.to_string(),
    }
}

/// Strip the query (which carries the auth token) from URLs shown to users
fn redact(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

/// Remove the query of `url` from error text
fn scrub(text: String, url: &str) -> String {
    match url.split_once('?') {
        Some((_, query)) if !query.is_empty() => text.replace(query, "<redacted>"),
        _ => text,
    }
}

/// Join a metadata-supplied relative path onto `dir`, refusing escapes
fn safe_join(dir: &Path, relative: &str) -> std::result::Result<PathBuf, MirrorError> {
    let relative_path = Path::new(relative);
    let escapes = relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.is_empty() || escapes {
        return Err(MirrorError::Metadata(format!(
            "refusing unsafe location {relative}"
        )));
    }
    Ok(dir.join(relative_path))
}
