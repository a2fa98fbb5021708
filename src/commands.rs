// src/commands.rs
//! Command handlers for the conary-mirror CLI

mod import;
mod mirror;
mod repo;

pub use import::cmd_import;
pub use mirror::cmd_mirror;
pub use repo::{cmd_repos_disable, cmd_repos_enable, cmd_repos_list};

use anyhow::Result;
use tracing::info;

/// Initialize the mirror database
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing mirror database at: {}", db_path);
    conary_mirror::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}
