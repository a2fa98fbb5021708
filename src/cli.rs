// src/cli.rs
//! CLI definitions for conary-mirror
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `init` - Create the mirror database
//! - `mirror` - Mirror all enabled repositories, or selected ones
//! - `repos` - List and enable/disable repositories
//! - `import` - Load products and repositories from a JSON document

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod mirror;
mod repo;

pub use mirror::MirrorCommands;
pub use repo::RepoCommands;

/// Default database location
pub const DEFAULT_DB_PATH: &str = "/var/lib/conary/mirror.db";

#[derive(Parser)]
#[command(name = "conary-mirror")]
#[command(author = "Conary Project")]
#[command(version)]
#[command(about = "Mirror package repositories for local distribution", long_about = None)]
pub struct Cli {
    /// Configuration file (default: /etc/conary/mirror.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long, global = true, default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the mirror database
    Init,

    /// Mirror repositories (all enabled repositories by default)
    Mirror {
        #[command(subcommand)]
        target: Option<MirrorCommands>,
    },

    /// Repository management
    #[command(subcommand)]
    Repos(RepoCommands),

    /// Import products and repositories from a JSON file
    Import {
        /// Path to the JSON document
        file: PathBuf,
    },
}
