// src/mirror/resolver.rs

//! Target resolution for `mirror repository` and `mirror product`
//!
//! Resolution never stops at the first bad target. Every identifier is
//! looked up, hits are collected into one batch, and misses become error
//! messages for the run report.

use crate::db::models::{ProductTarget, Repository};
use crate::error::{Error, Result};
use tracing::debug;

use super::store::RepositoryStore;

/// Repositories to mirror plus the errors found while resolving them
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub repositories: Vec<Repository>,
    pub errors: Vec<String>,
}

/// Normalize raw command-line targets
///
/// Arguments may carry several targets separated by commas or whitespace.
/// Empty pieces are dropped and duplicates removed, keeping first occurrence.
pub fn clean_target_input<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();

    for arg in raw {
        for piece in arg
            .as_ref()
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if !cleaned.iter().any(|existing| existing == piece) {
                cleaned.push(piece.to_string());
            }
        }
    }

    cleaned
}

/// Resolve repository external IDs
pub fn resolve_repositories<S: AsRef<str>>(
    store: &dyn RepositoryStore,
    ids: &[S],
) -> Result<Resolution> {
    let ids = clean_target_input(ids);
    if ids.is_empty() {
        return Err(Error::UsageError("No repository IDs supplied".to_string()));
    }

    let mut resolution = Resolution::default();

    for id in &ids {
        let found = match id.parse::<i64>() {
            Ok(external_id) => store.find_by_external_id(external_id)?,
            Err(_) => None,
        };

        match found {
            None => resolution
                .errors
                .push(format!("Repository with ID {id} not found")),
            Some(repo) if !repo.mirroring_enabled => resolution.errors.push(format!(
                "Mirroring of repository with ID {} is not enabled",
                repo.external_id
            )),
            Some(repo) => resolution.repositories.push(repo),
        }
    }

    debug!(
        "Resolved {} of {} repository targets",
        resolution.repositories.len(),
        ids.len()
    );
    Ok(resolution)
}

/// Resolve product targets to their mirroring-enabled repositories
///
/// A target is an upstream product ID or `identifier/version[/arch]`.
/// Repositories of all targets are merged into one batch in target order.
pub fn resolve_products<S: AsRef<str>>(
    store: &dyn RepositoryStore,
    targets: &[S],
) -> Result<Resolution> {
    let targets = clean_target_input(targets);
    if targets.is_empty() {
        return Err(Error::UsageError("No product IDs supplied".to_string()));
    }

    let mut resolution = Resolution::default();

    for raw in &targets {
        let target = match raw.parse::<ProductTarget>() {
            Ok(target) => target,
            Err(e) => {
                debug!("{}", e);
                resolution
                    .errors
                    .push(format!("Product for target {raw} not found"));
                continue;
            }
        };

        let products = store.find_products_by_target(&target)?;
        if products.is_empty() {
            let message = match target {
                ProductTarget::ExternalId(_) => format!("Product with ID {raw} not found"),
                ProductTarget::Triple { .. } => format!("Product for target {raw} not found"),
            };
            resolution.errors.push(message);
            continue;
        }

        for descriptor in products {
            let enabled: Vec<Repository> = descriptor
                .repositories
                .into_iter()
                .filter(|r| r.mirroring_enabled)
                .collect();

            if enabled.is_empty() {
                resolution
                    .errors
                    .push(format!("Product {raw} has no repositories enabled"));
            }
            resolution.repositories.extend(enabled);
        }
    }

    debug!(
        "Resolved {} product targets to {} repositories",
        targets.len(),
        resolution.repositories.len()
    );
    Ok(resolution)
}
