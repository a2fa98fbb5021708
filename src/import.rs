// src/import.rs

//! Product and repository import
//!
//! Upstream product data arrives as a JSON document:
//!
//! ```json
//! { "products": [ { "id": 1575, "identifier": "SLES", "version": "15.5",
//!                   "arch": "x86_64", "name": "SUSE Linux Enterprise Server",
//!                   "repositories": [ { "id": 5664, "name": "SLE-Product-SLES15-SP5-Pool",
//!                                       "url": "https://updates.example.com/...",
//!                                       "auth_token": null, "enabled": true } ] } ] }
//! ```
//!
//! Everything is upserted by upstream ID in a single transaction. A
//! repository's mirroring flag is only changed when `enabled` is present.

use crate::db;
use crate::db::models::{Product, Repository};
use crate::error::{Error, Result};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub products: Vec<ImportedProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedProduct {
    pub id: i64,
    pub identifier: String,
    pub version: String,
    #[serde(default)]
    pub arch: Option<String>,
    pub name: String,
    #[serde(default)]
    pub repositories: Vec<ImportedRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedRepository {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Counts of upserted records
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub products: usize,
    pub repositories: usize,
}

impl ImportDocument {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ParseError(format!("Invalid import document: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        Self::parse(&text)
    }

    /// Upsert every product and repository in one transaction
    pub fn apply(&self, conn: &mut Connection) -> Result<ImportStats> {
        db::transaction(conn, |tx| {
            let mut stats = ImportStats::default();
            let mut seen_repositories = Vec::new();

            for imported in &self.products {
                let mut product = Product::new(
                    imported.id,
                    imported.identifier.clone(),
                    imported.version.clone(),
                    imported.name.clone(),
                );
                product.arch = imported.arch.clone();
                let product_id = product.upsert(tx)?;
                stats.products += 1;
                debug!("Imported product {} ({})", product.triple(), imported.id);

                for imported_repo in &imported.repositories {
                    let mut repo = Repository::new(
                        imported_repo.id,
                        imported_repo.name.clone(),
                        imported_repo.url.clone(),
                    );
                    repo.auth_token = imported_repo.auth_token.clone();
                    repo.mirroring_enabled = imported_repo.enabled.unwrap_or(false);
                    let repo_id = repo.upsert(tx)?;

                    if let Some(enabled) = imported_repo.enabled {
                        Repository::set_mirroring_enabled(tx, imported_repo.id, enabled)?;
                    }
                    Product::link_repository(tx, product_id, repo_id)?;

                    if !seen_repositories.contains(&repo_id) {
                        seen_repositories.push(repo_id);
                        stats.repositories += 1;
                    }
                }
            }

            Ok(stats)
        })
        .inspect(|stats| {
            info!(
                "Imported {} products and {} repositories",
                stats.products, stats.repositories
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ProductTarget;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "products": [
            {
                "id": 1575, "identifier": "SLES", "version": "15.5", "arch": "x86_64",
                "name": "SUSE Linux Enterprise Server 15 SP5",
                "repositories": [
                    { "id": 5664, "name": "SLE-Product-SLES15-SP5-Pool",
                      "url": "https://updates.example.com/SUSE/Products/SLE-Product-SLES/15-SP5/x86_64/product/",
                      "enabled": true },
                    { "id": 5665, "name": "SLE-Product-SLES15-SP5-Updates",
                      "url": "https://updates.example.com/SUSE/Updates/SLE-Product-SLES/15-SP5/x86_64/update/",
                      "auth_token": "secret" }
                ]
            },
            {
                "id": 1576, "identifier": "sle-module-basesystem", "version": "15.5",
                "name": "Basesystem Module",
                "repositories": [
                    { "id": 5665, "name": "SLE-Product-SLES15-SP5-Updates",
                      "url": "https://updates.example.com/SUSE/Updates/SLE-Product-SLES/15-SP5/x86_64/update/",
                      "auth_token": "secret" }
                ]
            }
        ]
    }"#;

    fn create_db() -> (TempDir, Connection) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mirror.db");
        let path = path.to_str().unwrap();
        db::init(path).unwrap();
        let conn = db::open(path).unwrap();
        (temp_dir, conn)
    }

    #[test]
    fn test_import_creates_records() {
        let (_temp, mut conn) = create_db();
        let stats = ImportDocument::parse(DOCUMENT).unwrap().apply(&mut conn).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                products: 2,
                repositories: 2
            }
        );

        let pool = Repository::find_by_external_id(&conn, 5664).unwrap().unwrap();
        assert!(pool.mirroring_enabled);
        let updates = Repository::find_by_external_id(&conn, 5665).unwrap().unwrap();
        assert!(!updates.mirroring_enabled);
        assert_eq!(updates.auth_token.as_deref(), Some("secret"));

        let products =
            Product::find_by_target(&conn, &ProductTarget::ExternalId(1576)).unwrap();
        let repos = Product::repositories(&conn, products[0].id.unwrap()).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].external_id, 5665);
    }

    #[test]
    fn test_reimport_keeps_mirroring_flag() {
        let (_temp, mut conn) = create_db();
        let document = ImportDocument::parse(DOCUMENT).unwrap();
        document.apply(&mut conn).unwrap();

        Repository::set_mirroring_enabled(&conn, 5665, true).unwrap();
        document.apply(&mut conn).unwrap();

        let updates = Repository::find_by_external_id(&conn, 5665).unwrap().unwrap();
        assert!(updates.mirroring_enabled);
        assert_eq!(Repository::list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_explicit_enabled_overrides() {
        let (_temp, mut conn) = create_db();
        ImportDocument::parse(DOCUMENT).unwrap().apply(&mut conn).unwrap();

        let disable = r#"{ "products": [ { "id": 1575, "identifier": "SLES", "version": "15.5",
            "name": "SLES", "repositories": [ { "id": 5664, "name": "Pool",
            "url": "https://updates.example.com/pool/", "enabled": false } ] } ] }"#;
        ImportDocument::parse(disable).unwrap().apply(&mut conn).unwrap();

        let pool = Repository::find_by_external_id(&conn, 5664).unwrap().unwrap();
        assert!(!pool.mirroring_enabled);
        assert_eq!(pool.name, "Pool");
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            ImportDocument::parse("{ \"products\": [ { \"id\": \"x\" } ] }"),
            Err(Error::ParseError(_))
        ));
    }
}
