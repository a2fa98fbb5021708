// src/mirror/store.rs

//! Narrow store interface used by the mirror run
//!
//! The run only ever needs four queries, so the orchestration code depends
//! on [`RepositoryStore`] rather than on rusqlite directly. [`SqliteStore`]
//! is the production adapter.

use crate::db::models::{Product, ProductTarget, Repository};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::convergence::ProcessedSet;

/// A product together with every repository linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDescriptor {
    pub product: Product,
    pub repositories: Vec<Repository>,
}

/// Repository/product lookups needed by a mirror run
pub trait RepositoryStore {
    /// Repositories marked for mirroring that are not in `processed`
    fn find_eligible_excluding(&self, processed: &ProcessedSet) -> Result<Vec<Repository>>;

    /// Repository with the given upstream ID, enabled or not
    fn find_by_external_id(&self, external_id: i64) -> Result<Option<Repository>>;

    /// Products matching a parsed target, with their repositories
    fn find_products_by_target(&self, target: &ProductTarget) -> Result<Vec<ProductDescriptor>>;

    /// Record a successful mirror of the repository with internal ID `repository_id`
    fn mark_mirrored(&self, repository_id: i64, timestamp: DateTime<Utc>) -> Result<()>;
}

/// [`RepositoryStore`] over a SQLite connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the store at `db_path`
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self::new(crate::db::open(db_path)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RepositoryStore for SqliteStore {
    fn find_eligible_excluding(&self, processed: &ProcessedSet) -> Result<Vec<Repository>> {
        Repository::list_mirroring_enabled_excluding(&self.conn, &processed.to_vec())
    }

    fn find_by_external_id(&self, external_id: i64) -> Result<Option<Repository>> {
        Repository::find_by_external_id(&self.conn, external_id)
    }

    fn find_products_by_target(&self, target: &ProductTarget) -> Result<Vec<ProductDescriptor>> {
        Product::find_by_target(&self.conn, target)?
            .into_iter()
            .map(|product| {
                let repositories = match product.id {
                    Some(id) => Product::repositories(&self.conn, id)?,
                    None => Vec::new(),
                };
                Ok(ProductDescriptor {
                    product,
                    repositories,
                })
            })
            .collect()
    }

    fn mark_mirrored(&self, repository_id: i64, timestamp: DateTime<Utc>) -> Result<()> {
        Repository::refresh_timestamp(&self.conn, repository_id, &timestamp.to_rfc3339())
    }
}
