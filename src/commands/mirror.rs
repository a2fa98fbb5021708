// src/commands/mirror.rs
//! Mirror command

use crate::cli::MirrorCommands;
use anyhow::Result;
use conary_mirror::config::MirrorConfig;
use conary_mirror::mirror::{HttpMirrorEngine, RunController, RunOptions, SqliteStore};
use tracing::info;

/// Run one mirror pass over the requested targets
pub fn cmd_mirror(target: Option<MirrorCommands>, db_path: &str, config: &MirrorConfig) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let engine = HttpMirrorEngine::new(config)?;
    info!("Mirror root: {}", engine.root().display());

    let controller = RunController::new(store, engine, RunOptions::from_config(config, db_path));

    let stats = match target.unwrap_or(MirrorCommands::All) {
        MirrorCommands::All => controller.mirror_all()?,
        MirrorCommands::Repository { ids } => controller.mirror_repositories(&ids)?,
        MirrorCommands::Product { ids } => controller.mirror_products(&ids)?,
    };

    println!("Mirrored {} repositories", stats.mirrored);
    Ok(())
}
