// src/db/paths.rs
//! Centralized path derivation for mirror state directories

use std::path::{Path, PathBuf};

/// Get the directory containing the database
///
/// A bare file name lives in the current directory.
pub fn db_dir(db_path: &str) -> PathBuf {
    Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}

/// Get the directory holding run lock files
///
/// `CONARY_LOCK_DIR` overrides the default, which sits next to the database.
pub fn lock_dir(db_path: &str) -> PathBuf {
    std::env::var("CONARY_LOCK_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| db_dir(db_path).join("locks"))
}

/// Get the lock file for a run kind
pub fn lock_file(lock_dir: &Path, key: &str) -> PathBuf {
    lock_dir.join(format!("{key}.lock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_dir() {
        assert_eq!(
            db_dir("/var/lib/conary/mirror.db"),
            PathBuf::from("/var/lib/conary")
        );
    }

    #[test]
    fn test_db_dir_relative_file() {
        assert_eq!(db_dir("mirror.db"), PathBuf::from("."));
        assert_eq!(db_dir("state/mirror.db"), PathBuf::from("state"));
    }

    #[test]
    fn test_lock_dir_beside_relative_database() {
        if std::env::var_os("CONARY_LOCK_DIR").is_none() {
            assert_eq!(lock_dir("mirror.db"), PathBuf::from("./locks"));
        }
    }

    #[test]
    fn test_lock_file() {
        assert_eq!(
            lock_file(Path::new("/var/lib/conary/locks"), "mirror"),
            PathBuf::from("/var/lib/conary/locks/mirror.lock")
        );
    }
}
