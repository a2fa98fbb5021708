// src/mirror/lock.rs

//! Run-scoped exclusive lock
//!
//! Only one mirror run may execute at a time for a given run key. The lock
//! is an advisory `flock(LOCK_EX)` on `<lock_dir>/<key>.lock`, taken without
//! waiting: a second run fails immediately instead of queuing behind the
//! first.
//!
//! # Example
//!
//! ```ignore
//! use conary_mirror::mirror::lock::{with_lock, MIRROR_LOCK_KEY};
//!
//! with_lock(lock_dir, MIRROR_LOCK_KEY, || {
//!     // ... mirror repositories ...
//!     Ok(())
//! })?;
//! ```

use crate::db::paths;
use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lock key for mirror runs
pub const MIRROR_LOCK_KEY: &str = "mirror";

/// Held run lock, released on drop
pub struct RunLock {
    /// The lock file handle (kept open to maintain lock)
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
    key: String,
}

impl RunLock {
    /// Try to take the lock for `key` without blocking
    ///
    /// Fails with [`Error::LockHeld`] if another process (or another handle
    /// in this process) holds it.
    pub fn try_acquire(lock_dir: &Path, key: &str) -> Result<Self> {
        fs::create_dir_all(lock_dir)?;
        let path = paths::lock_file(lock_dir, key);

        let file = File::create(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired {} lock at {:?}", key, path);
                let lock = Self {
                    file,
                    path,
                    key: key.to_string(),
                };
                lock.write_pid()?;
                Ok(lock)
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                info!("{} lock already held at {:?}", key, path);
                Err(Error::LockHeld {
                    key: key.to_string(),
                    path: path.display().to_string(),
                    holder_pid: Self::holder_pid(lock_dir, key),
                })
            }
            Err(e) => Err(Error::IoError(format!(
                "Failed to acquire {} lock at {}: {}",
                key,
                path.display(),
                e
            ))),
        }
    }

    /// Check whether the lock file is currently locked by anyone
    pub fn is_held(lock_dir: &Path, key: &str) -> bool {
        let path = paths::lock_file(lock_dir, key);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = file.unlock();
                false
            }
            Err(_) => true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// PID recorded by the current holder, if any
    pub fn holder_pid(lock_dir: &Path, key: &str) -> Option<u32> {
        let pid_path = paths::lock_file(lock_dir, key).with_extension("pid");
        fs::read_to_string(pid_path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    fn write_pid(&self) -> Result<()> {
        fs::write(self.path.with_extension("pid"), std::process::id().to_string())?;
        Ok(())
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(self.path.with_extension("pid"));
        debug!("Released {} lock at {:?}", self.key, self.path);
    }
}

/// Run `body` while holding the lock for `key`
///
/// The lock is released on every exit path, including errors and panics.
pub fn with_lock<T, F>(lock_dir: &Path, key: &str, body: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _lock = RunLock::try_acquire(lock_dir, key)?;
    body()
}
