// src/mirror/invoker.rs

//! Per-repository mirror invocation with failure isolation

use crate::db::models::Repository;
use crate::error::Result;
use chrono::Utc;
use tracing::{info, warn};

use super::engine::{MirrorEngine, local_path_for_url};
use super::store::RepositoryStore;

/// Result of mirroring one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    Mirrored,
    /// Mirroring failed; carries the message to record for the run
    Failed(String),
}

impl MirrorOutcome {
    pub fn is_mirrored(&self) -> bool {
        matches!(self, Self::Mirrored)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Mirrored => None,
            Self::Failed(message) => Some(message),
        }
    }
}

/// Hands single repositories to the engine and records successes in the store
pub struct MirrorInvoker<'a> {
    store: &'a dyn RepositoryStore,
    engine: &'a dyn MirrorEngine,
}

impl<'a> MirrorInvoker<'a> {
    pub fn new(store: &'a dyn RepositoryStore, engine: &'a dyn MirrorEngine) -> Self {
        Self { store, engine }
    }

    /// Mirror one repository
    ///
    /// Engine failures come back as [`MirrorOutcome::Failed`]. Only store
    /// failures are returned as errors.
    pub fn invoke(&self, repo: &Repository) -> Result<MirrorOutcome> {
        let id = repo.require_id()?;
        info!("Mirroring repository '{}' ({})", repo.name, id);

        let result = local_path_for_url(&repo.url).and_then(|local_path| {
            self.engine
                .mirror(&repo.url, &local_path, repo.auth_token.as_deref(), &repo.name)
        });

        match result {
            Ok(()) => {
                self.store.mark_mirrored(id, Utc::now())?;
                info!("Mirrored repository '{}'", repo.name);
                Ok(MirrorOutcome::Mirrored)
            }
            Err(e) => {
                warn!("Mirroring repository '{}' failed: {}", repo.name, e);
                Ok(MirrorOutcome::Failed(format!(
                    "Repository '{}' ({}): {}",
                    repo.name, id, e
                )))
            }
        }
    }

    /// Mirror the upstream product tree
    pub fn invoke_product_tree(&self, url: &str) -> MirrorOutcome {
        info!("Mirroring product tree from {}", url);
        match self.engine.mirror_product_tree(url) {
            Ok(()) => MirrorOutcome::Mirrored,
            Err(e) => {
                warn!("Mirroring product tree failed: {}", e);
                MirrorOutcome::Failed(format!("Mirroring product tree failed: {e}"))
            }
        }
    }
}
