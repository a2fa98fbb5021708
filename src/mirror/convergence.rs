// src/mirror/convergence.rs

//! Convergence loop over the eligible repository set
//!
//! The set of repositories marked for mirroring can change while a run is in
//! progress. The loop re-queries the store after every batch, excluding
//! everything already attempted, and stops once the store has nothing new.
//! Every eligible repository is attempted at most once per run.

use crate::db::models::Repository;
use crate::error::Result;
use std::collections::BTreeSet;
use std::ops::AddAssign;
use tracing::{debug, info, warn};

use super::invoker::{MirrorInvoker, MirrorOutcome};
use super::report::ErrorReport;
use super::store::RepositoryStore;

/// Internal IDs of repositories attempted during the current run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessedSet {
    ids: BTreeSet<i64>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ID, returning false if it was already present
    pub fn insert(&mut self, id: i64) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDs in ascending order
    pub fn to_vec(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}

/// Counters for one or more batches
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub attempted: usize,
    pub mirrored: usize,
    pub failed: usize,
}

impl AddAssign for BatchStats {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.mirrored += other.mirrored;
        self.failed += other.failed;
    }
}

/// Result of a full convergence run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceSummary {
    pub passes: u32,
    pub stats: BatchStats,
}

/// Mirror every repository in `batch` once
///
/// Repositories already in `processed` are skipped. Each attempted ID is
/// added to `processed` whatever the outcome, and failures are recorded in
/// `report`.
pub fn mirror_batch(
    invoker: &MirrorInvoker<'_>,
    batch: &[Repository],
    processed: &mut ProcessedSet,
    report: &mut ErrorReport,
) -> Result<BatchStats> {
    let mut stats = BatchStats::default();

    for repo in batch {
        let id = repo.require_id()?;
        if processed.contains(id) {
            debug!("Repository '{}' ({}) already attempted, skipping", repo.name, id);
            continue;
        }

        let outcome = invoker.invoke(repo);
        processed.insert(id);
        stats.attempted += 1;

        match outcome? {
            MirrorOutcome::Mirrored => stats.mirrored += 1,
            MirrorOutcome::Failed(message) => {
                stats.failed += 1;
                report.record(message);
            }
        }
    }

    Ok(stats)
}

/// Mirror eligible repositories until the store returns none that are new
///
/// `max_passes` bounds the number of batches; `None` means unbounded. When
/// the bound is hit with repositories still pending, an error is recorded.
pub fn converge(
    store: &dyn RepositoryStore,
    invoker: &MirrorInvoker<'_>,
    processed: &mut ProcessedSet,
    report: &mut ErrorReport,
    max_passes: Option<u32>,
) -> Result<ConvergenceSummary> {
    let mut summary = ConvergenceSummary::default();

    loop {
        let batch = store.find_eligible_excluding(processed)?;
        if batch.is_empty() {
            break;
        }

        if let Some(limit) = max_passes
            && summary.passes >= limit
        {
            warn!(
                "Pass limit of {} reached with {} repositories pending",
                limit,
                batch.len()
            );
            report.record(format!(
                "Mirroring stopped after {} passes with repositories still pending",
                summary.passes
            ));
            break;
        }

        summary.passes += 1;
        debug!("Pass {}: {} repositories", summary.passes, batch.len());

        let stats = mirror_batch(invoker, &batch, processed, report)?;
        summary.stats += stats;

        if stats.attempted == 0 {
            warn!("Store returned only repositories already attempted, stopping");
            break;
        }
    }

    info!(
        "Convergence finished after {} passes: {} mirrored, {} failed",
        summary.passes, summary.stats.mirrored, summary.stats.failed
    );
    Ok(summary)
}
