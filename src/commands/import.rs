// src/commands/import.rs
//! Import command

use anyhow::Result;
use conary_mirror::import::ImportDocument;
use std::path::Path;
use tracing::info;

/// Import products and repositories from a JSON document
pub fn cmd_import(file: &Path, db_path: &str) -> Result<()> {
    info!("Importing products from {}", file.display());
    let document = ImportDocument::load(file)?;

    let mut conn = conary_mirror::db::open(db_path)?;
    let stats = document.apply(&mut conn)?;

    println!(
        "Imported {} products and {} repositories",
        stats.products, stats.repositories
    );
    Ok(())
}
