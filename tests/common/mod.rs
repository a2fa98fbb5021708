// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use conary_mirror::db;
use conary_mirror::db::models::{Product, ProductTarget, Repository};
use conary_mirror::mirror::{
    MirrorEngine, MirrorError, ProcessedSet, ProductDescriptor, RepositoryStore, RunOptions,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a stored repository with internal ID `id` and upstream ID `id * 100`
pub fn repo(id: i64, name: &str, enabled: bool) -> Repository {
    let mut repo = Repository::new(
        id * 100,
        name.to_string(),
        format!("https://updates.example.com/repo/{name}/"),
    );
    repo.id = Some(id);
    repo.mirroring_enabled = enabled;
    repo
}

/// Run options with the lock in a fresh temp dir and no product tree
///
/// Returns (TempDir, options) - keep the TempDir alive to prevent cleanup.
pub fn run_options() -> (TempDir, RunOptions) {
    let temp_dir = tempfile::tempdir().unwrap();
    let options = RunOptions {
        lock_dir: temp_dir.path().join("locks"),
        product_tree_url: None,
        max_passes: None,
    };
    (temp_dir, options)
}

/// In-memory store with scriptable eligibility changes
///
/// `enable_after_query(n, id)` flips a repository to mirroring-enabled right
/// after the n-th eligibility query (1-based) has been answered, so the change
/// shows up on the next pass.
#[derive(Default)]
pub struct FakeStore {
    repositories: RefCell<Vec<Repository>>,
    products: Vec<(Product, Vec<i64>)>,
    scripted_enables: RefCell<Vec<(usize, i64)>>,
    eligibility_queries: Cell<usize>,
    marked: RefCell<Vec<i64>>,
}

impl FakeStore {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self {
            repositories: RefCell::new(repositories),
            ..Self::default()
        }
    }

    /// Add a product linked to repositories by internal ID
    pub fn with_product(mut self, external_id: i64, identifier: &str, repository_ids: &[i64]) -> Self {
        let mut product = Product::new(
            external_id,
            identifier.to_string(),
            "15.5".to_string(),
            format!("{identifier} 15.5"),
        );
        product.id = Some(external_id);
        product.arch = Some("x86_64".to_string());
        self.products.push((product, repository_ids.to_vec()));
        self
    }

    pub fn enable_after_query(&self, query: usize, id: i64) {
        self.scripted_enables.borrow_mut().push((query, id));
    }

    pub fn eligibility_queries(&self) -> usize {
        self.eligibility_queries.get()
    }

    /// Internal IDs passed to `mark_mirrored`, in call order
    pub fn marked(&self) -> Vec<i64> {
        self.marked.borrow().clone()
    }

    pub fn last_mirrored_at(&self, id: i64) -> Option<String> {
        self.repositories
            .borrow()
            .iter()
            .find(|r| r.id == Some(id))
            .and_then(|r| r.last_mirrored_at.clone())
    }

    fn repository(&self, id: i64) -> Option<Repository> {
        self.repositories
            .borrow()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
    }
}

impl RepositoryStore for FakeStore {
    fn find_eligible_excluding(
        &self,
        processed: &ProcessedSet,
    ) -> conary_mirror::Result<Vec<Repository>> {
        let query = self.eligibility_queries.get() + 1;
        self.eligibility_queries.set(query);

        let mut eligible: Vec<Repository> = self
            .repositories
            .borrow()
            .iter()
            .filter(|r| r.mirroring_enabled)
            .filter(|r| r.id.is_some_and(|id| !processed.contains(id)))
            .cloned()
            .collect();
        eligible.sort_by_key(|r| r.id);

        let mut repositories = self.repositories.borrow_mut();
        for (_, id) in self
            .scripted_enables
            .borrow()
            .iter()
            .filter(|(after, _)| *after == query)
        {
            if let Some(repo) = repositories.iter_mut().find(|r| r.id == Some(*id)) {
                repo.mirroring_enabled = true;
            }
        }

        Ok(eligible)
    }

    fn find_by_external_id(&self, external_id: i64) -> conary_mirror::Result<Option<Repository>> {
        Ok(self
            .repositories
            .borrow()
            .iter()
            .find(|r| r.external_id == external_id)
            .cloned())
    }

    fn find_products_by_target(
        &self,
        target: &ProductTarget,
    ) -> conary_mirror::Result<Vec<ProductDescriptor>> {
        Ok(self
            .products
            .iter()
            .filter(|(product, _)| match target {
                ProductTarget::ExternalId(id) => product.external_id == *id,
                ProductTarget::Triple {
                    identifier,
                    version,
                    arch,
                } => {
                    product.identifier == *identifier
                        && product.version == *version
                        && (arch.is_none() || product.arch == *arch)
                }
            })
            .map(|(product, ids)| ProductDescriptor {
                product: product.clone(),
                repositories: ids.iter().filter_map(|id| self.repository(*id)).collect(),
            })
            .collect())
    }

    fn mark_mirrored(&self, repository_id: i64, timestamp: DateTime<Utc>) -> conary_mirror::Result<()> {
        self.marked.borrow_mut().push(repository_id);
        if let Some(repo) = self
            .repositories
            .borrow_mut()
            .iter_mut()
            .find(|r| r.id == Some(repository_id))
        {
            repo.last_mirrored_at = Some(timestamp.to_rfc3339());
        }
        Ok(())
    }
}

/// One recorded `MirrorEngine::mirror` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    pub url: String,
    pub local_path: PathBuf,
    pub auth_token: Option<String>,
    pub name: String,
}

/// Engine that records calls and fails repositories by name
#[derive(Default)]
pub struct FakeEngine {
    failures: HashMap<String, String>,
    product_tree_failure: Option<String>,
    calls: RefCell<Vec<EngineCall>>,
    product_tree_calls: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every mirror of the repository called `name`
    pub fn failing(mut self, name: &str, reason: &str) -> Self {
        self.failures.insert(name.to_string(), reason.to_string());
        self
    }

    pub fn failing_product_tree(mut self, reason: &str) -> Self {
        self.product_tree_failure = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    /// Names of mirrored repositories, in call order
    pub fn mirrored_names(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.name.clone()).collect()
    }

    pub fn product_tree_calls(&self) -> Vec<String> {
        self.product_tree_calls.borrow().clone()
    }
}

impl MirrorEngine for FakeEngine {
    fn mirror(
        &self,
        url: &str,
        local_path: &Path,
        auth_token: Option<&str>,
        name: &str,
    ) -> Result<(), MirrorError> {
        self.calls.borrow_mut().push(EngineCall {
            url: url.to_string(),
            local_path: local_path.to_path_buf(),
            auth_token: auth_token.map(str::to_string),
            name: name.to_string(),
        });

        match self.failures.get(name) {
            Some(reason) => Err(MirrorError::Metadata(reason.clone())),
            None => Ok(()),
        }
    }

    fn mirror_product_tree(&self, url: &str) -> Result<(), MirrorError> {
        self.product_tree_calls.borrow_mut().push(url.to_string());
        match &self.product_tree_failure {
            Some(reason) => Err(MirrorError::Download {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Create a migrated database with three repositories and one product.
///
/// Repositories (upstream IDs): 100 "pool" (enabled), 200 "updates"
/// (enabled), 300 "debug" (disabled). Product 1575 SLES/15.5/x86_64 links
/// all three.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_mirror_test_db() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("mirror.db")
        .to_str()
        .unwrap()
        .to_string();

    db::init(&db_path).unwrap();
    let mut conn = db::open(&db_path).unwrap();

    db::transaction(&mut conn, |tx| {
        let mut product = Product::new(
            1575,
            "SLES".to_string(),
            "15.5".to_string(),
            "SUSE Linux Enterprise Server 15 SP5".to_string(),
        );
        product.arch = Some("x86_64".to_string());
        let product_id = product.insert(tx)?;

        for (external_id, name, enabled) in
            [(100, "pool", true), (200, "updates", true), (300, "debug", false)]
        {
            let mut repo = Repository::new(
                external_id,
                name.to_string(),
                format!("https://updates.example.com/SUSE/SLES/15-SP5/{name}/"),
            );
            repo.mirroring_enabled = enabled;
            let repo_id = repo.insert(tx)?;
            Product::link_repository(tx, product_id, repo_id)?;
        }
        Ok(())
    })
    .unwrap();

    (temp_dir, db_path)
}
