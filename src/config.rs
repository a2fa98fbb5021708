// src/config.rs
//! Configuration file parsing for conary-mirror
//!
//! Supports a TOML configuration file with the following sections:
//! - [mirror] - Mirror root, product tree URL, source packages, pass limit
//! - [http] - Transfer timeout and retries
//!
//! Every key is optional; a missing default config file means defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/conary/mirror.toml";

/// Upstream product tree mirrored before `mirror all` unless overridden
pub const DEFAULT_PRODUCT_TREE_URL: &str = "https://scc.suse.com/suma/";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    /// Mirror settings
    #[serde(default)]
    pub mirror: MirrorSection,

    /// HTTP transfer settings
    #[serde(default)]
    pub http: HttpSection,
}

/// Mirror configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorSection {
    /// Directory that receives mirrored repositories
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Upstream product tree, mirrored once before `mirror all`
    ///
    /// An empty string turns the product tree step off.
    #[serde(default = "default_product_tree_url")]
    pub product_tree_url: Option<String>,

    /// Also mirror source packages
    #[serde(default)]
    pub mirror_src: bool,

    /// Upper bound on convergence passes (0 = unbounded)
    #[serde(default)]
    pub max_passes: u32,

    /// Directory for run lock files (defaults to `locks/` next to the database)
    #[serde(default)]
    pub lock_dir: Option<PathBuf>,
}

impl Default for MirrorSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            product_tree_url: default_product_tree_url(),
            mirror_src: false,
            max_passes: 0,
            lock_dir: None,
        }
    }
}

fn default_product_tree_url() -> Option<String> {
    Some(DEFAULT_PRODUCT_TREE_URL.to_string())
}

fn default_root() -> PathBuf {
    PathBuf::from("/var/lib/conary/mirror")
}

/// HTTP configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per file before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl MirrorConfig {
    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))
    }

    /// Load an explicitly requested file, or the default file if it exists
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("No config at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Product tree URL, `None` when disabled
    pub fn product_tree_url(&self) -> Option<&str> {
        self.mirror
            .product_tree_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Convergence pass limit, `None` when unbounded
    pub fn max_passes(&self) -> Option<u32> {
        (self.mirror.max_passes > 0).then_some(self.mirror.max_passes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::parse("").unwrap();
        assert_eq!(config.mirror.root, PathBuf::from("/var/lib/conary/mirror"));
        assert_eq!(config.product_tree_url(), Some(DEFAULT_PRODUCT_TREE_URL));
        assert!(!config.mirror.mirror_src);
        assert_eq!(config.max_passes(), None);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_full_config() {
        let config = MirrorConfig::parse(
            r#"
            [mirror]
            root = "/srv/mirror"
            product_tree_url = "https://updates.example.com/product-tree/"
            mirror_src = true
            max_passes = 5
            lock_dir = "/run/conary"

            [http]
            timeout_secs = 120
            max_retries = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.mirror.root, PathBuf::from("/srv/mirror"));
        assert_eq!(
            config.mirror.product_tree_url.as_deref(),
            Some("https://updates.example.com/product-tree/")
        );
        assert!(config.mirror.mirror_src);
        assert_eq!(config.max_passes(), Some(5));
        assert_eq!(config.mirror.lock_dir, Some(PathBuf::from("/run/conary")));
        assert_eq!(config.http.timeout_secs, 120);
        assert_eq!(config.http.max_retries, 6);
    }

    #[test]
    fn test_empty_product_tree_url_disables_it() {
        let config = MirrorConfig::parse("[mirror]\nproduct_tree_url = \"\"").unwrap();
        assert_eq!(config.product_tree_url(), None);
    }

    #[test]
    fn test_invalid_config() {
        let result = MirrorConfig::parse("[mirror]\nmax_passes = \"lots\"");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mirror]\nroot = \"/tmp/mirror\"").unwrap();

        let config = MirrorConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.mirror.root, PathBuf::from("/tmp/mirror"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = MirrorConfig::load_or_default(Some(Path::new("/nonexistent/mirror.toml")));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
