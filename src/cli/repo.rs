// src/cli/repo.rs
//! Repository management commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum RepoCommands {
    /// List repositories marked for mirroring
    List {
        /// Show all repositories (including those not mirrored)
        #[arg(short, long)]
        all: bool,
    },

    /// Enable mirroring of repositories
    Enable {
        /// Repository IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Disable mirroring of repositories
    Disable {
        /// Repository IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}
