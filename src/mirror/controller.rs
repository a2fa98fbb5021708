// src/mirror/controller.rs

//! Entry point for mirror runs
//!
//! A [`RunController`] owns the store and the engine for the lifetime of the
//! process. Each `mirror_*` method is one run: it takes the run lock, mirrors
//! its targets, and turns the collected errors into the run result.

use crate::config::MirrorConfig;
use crate::db::paths;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use super::convergence::{BatchStats, ProcessedSet, converge, mirror_batch};
use super::engine::MirrorEngine;
use super::invoker::{MirrorInvoker, MirrorOutcome};
use super::lock::{MIRROR_LOCK_KEY, with_lock};
use super::report::ErrorReport;
use super::resolver::{Resolution, resolve_products, resolve_repositories};
use super::store::RepositoryStore;

/// Settings for mirror runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory holding the run lock file
    pub lock_dir: PathBuf,
    /// Product tree mirrored before `mirror all`; skipped when unset
    pub product_tree_url: Option<String>,
    /// Convergence pass limit, `None` for unbounded
    pub max_passes: Option<u32>,
}

impl RunOptions {
    pub fn from_config(config: &MirrorConfig, db_path: &str) -> Self {
        Self {
            lock_dir: config
                .mirror
                .lock_dir
                .clone()
                .unwrap_or_else(|| paths::lock_dir(db_path)),
            product_tree_url: config.product_tree_url().map(str::to_string),
            max_passes: config.max_passes(),
        }
    }
}

/// Drives mirror runs against a store and an engine
pub struct RunController<S, E> {
    store: S,
    engine: E,
    options: RunOptions,
}

impl<S: RepositoryStore, E: MirrorEngine> RunController<S, E> {
    pub fn new(store: S, engine: E, options: RunOptions) -> Self {
        Self {
            store,
            engine,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    fn invoker(&self) -> MirrorInvoker<'_> {
        MirrorInvoker::new(&self.store, &self.engine)
    }

    /// Mirror every repository marked for mirroring
    ///
    /// Mirrors the product tree first (if configured), then keeps mirroring
    /// until no repository that became eligible during the run is left.
    pub fn mirror_all(&self) -> Result<BatchStats> {
        with_lock(&self.options.lock_dir, MIRROR_LOCK_KEY, || {
            let invoker = self.invoker();
            let mut report = ErrorReport::new();

            match &self.options.product_tree_url {
                Some(url) => {
                    if let MirrorOutcome::Failed(message) = invoker.invoke_product_tree(url) {
                        report.record(message);
                    }
                }
                None => debug!("No product tree URL configured, skipping product tree"),
            }

            let mut processed = ProcessedSet::new();
            if self.store.find_eligible_excluding(&processed)?.is_empty() {
                return Err(Error::UsageError(
                    "There are no repositories marked for mirroring.".to_string(),
                ));
            }

            let summary = converge(
                &self.store,
                &invoker,
                &mut processed,
                &mut report,
                self.options.max_passes,
            )?;

            finish_run(report)?;
            Ok(summary.stats)
        })
    }

    /// Mirror repositories by upstream ID
    pub fn mirror_repositories<T: AsRef<str>>(&self, ids: &[T]) -> Result<BatchStats> {
        with_lock(&self.options.lock_dir, MIRROR_LOCK_KEY, || {
            let resolution = resolve_repositories(&self.store, ids)?;
            self.mirror_resolution(resolution)
        })
    }

    /// Mirror the enabled repositories of the given products
    pub fn mirror_products<T: AsRef<str>>(&self, targets: &[T]) -> Result<BatchStats> {
        with_lock(&self.options.lock_dir, MIRROR_LOCK_KEY, || {
            let resolution = resolve_products(&self.store, targets)?;
            self.mirror_resolution(resolution)
        })
    }

    fn mirror_resolution(&self, resolution: Resolution) -> Result<BatchStats> {
        let mut report = ErrorReport::new();
        report.extend(resolution.errors);

        let mut processed = ProcessedSet::new();
        let stats = mirror_batch(
            &self.invoker(),
            &resolution.repositories,
            &mut processed,
            &mut report,
        )?;

        finish_run(report)?;
        Ok(stats)
    }
}

fn finish_run(report: ErrorReport) -> Result<()> {
    report.finish()?;
    info!("Mirroring complete.");
    Ok(())
}
