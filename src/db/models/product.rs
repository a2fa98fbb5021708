// src/db/models/product.rs

//! Product model - named groups of repositories
//!
//! Products are addressed on the command line either by their upstream ID
//! or by an `identifier/version[/arch]` triple.

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;
use std::str::FromStr;

use super::Repository;

const SELECT_COLUMNS: &str =
    "SELECT id, external_id, identifier, version, arch, name FROM products";

/// A product definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Option<i64>,
    pub external_id: i64,
    pub identifier: String,
    pub version: String,
    pub arch: Option<String>,
    pub name: String,
}

/// A parsed product target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductTarget {
    /// Upstream product ID
    ExternalId(i64),
    /// `identifier/version[/arch]`
    Triple {
        identifier: String,
        version: String,
        arch: Option<String>,
    },
}

impl FromStr for ProductTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::ExternalId(id));
        }

        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [identifier, version] if !identifier.is_empty() && !version.is_empty() => {
                Ok(Self::Triple {
                    identifier: identifier.to_string(),
                    version: version.to_string(),
                    arch: None,
                })
            }
            [identifier, version, arch]
                if !identifier.is_empty() && !version.is_empty() && !arch.is_empty() =>
            {
                Ok(Self::Triple {
                    identifier: identifier.to_string(),
                    version: version.to_string(),
                    arch: Some(arch.to_string()),
                })
            }
            _ => Err(format!("Invalid product target: {s}")),
        }
    }
}

impl fmt::Display for ProductTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalId(id) => write!(f, "{id}"),
            Self::Triple {
                identifier,
                version,
                arch: Some(arch),
            } => write!(f, "{identifier}/{version}/{arch}"),
            Self::Triple {
                identifier,
                version,
                arch: None,
            } => write!(f, "{identifier}/{version}"),
        }
    }
}

impl Product {
    /// Create a new Product
    pub fn new(external_id: i64, identifier: String, version: String, name: String) -> Self {
        Self {
            id: None,
            external_id,
            identifier,
            version,
            arch: None,
            name,
        }
    }

    /// Insert this product into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO products (external_id, identifier, version, arch, name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.external_id,
                &self.identifier,
                &self.version,
                &self.arch,
                &self.name,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Insert or refresh this product by upstream ID
    pub fn upsert(&mut self, conn: &Connection) -> Result<i64> {
        let id: i64 = conn.query_row(
            "INSERT INTO products (external_id, identifier, version, arch, name)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(external_id) DO UPDATE SET
                identifier = excluded.identifier,
                version = excluded.version,
                arch = excluded.arch,
                name = excluded.name
             RETURNING id",
            params![
                self.external_id,
                &self.identifier,
                &self.version,
                &self.arch,
                &self.name,
            ],
            |row| row.get(0),
        )?;

        self.id = Some(id);
        Ok(id)
    }

    /// Find a product by its upstream ID
    pub fn find_by_external_id(conn: &Connection, external_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE external_id = ?1"))?;
        let product = stmt.query_row([external_id], Self::from_row).optional()?;
        Ok(product)
    }

    /// Find products by identifier and version, optionally narrowed to one arch
    pub fn find_by_triple(
        conn: &Connection,
        identifier: &str,
        version: &str,
        arch: Option<&str>,
    ) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE identifier = ?1 AND version = ?2 AND (?3 IS NULL OR arch = ?3)
             ORDER BY id"
        ))?;

        let products = stmt
            .query_map(params![identifier, version, arch], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Find all products matching a parsed target
    pub fn find_by_target(conn: &Connection, target: &ProductTarget) -> Result<Vec<Self>> {
        match target {
            ProductTarget::ExternalId(id) => {
                Ok(Self::find_by_external_id(conn, *id)?.into_iter().collect())
            }
            ProductTarget::Triple {
                identifier,
                version,
                arch,
            } => Self::find_by_triple(conn, identifier, version, arch.as_deref()),
        }
    }

    /// List all products
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;

        let products = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Associate a repository with this product (no-op if already linked)
    pub fn link_repository(conn: &Connection, product_id: i64, repository_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO product_repositories (product_id, repository_id) VALUES (?1, ?2)",
            params![product_id, repository_id],
        )?;
        Ok(())
    }

    /// All repositories associated with a product
    pub fn repositories(conn: &Connection, product_id: i64) -> Result<Vec<Repository>> {
        let mut stmt = conn.prepare(
            "SELECT r.id, r.external_id, r.name, r.url, r.auth_token, r.mirroring_enabled,
                    r.last_mirrored_at, r.created_at
             FROM repositories r
             JOIN product_repositories pr ON pr.repository_id = r.id
             WHERE pr.product_id = ?1
             ORDER BY r.id",
        )?;

        let repos = stmt
            .query_map([product_id], Repository::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(repos)
    }

    /// Human-readable `identifier/version/arch` form
    pub fn triple(&self) -> String {
        match &self.arch {
            Some(arch) => format!("{}/{}/{}", self.identifier, self.version, arch),
            None => format!("{}/{}", self.identifier, self.version),
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            external_id: row.get(1)?,
            identifier: row.get(2)?,
            version: row.get(3)?,
            arch: row.get(4)?,
            name: row.get(5)?,
        })
    }
}
