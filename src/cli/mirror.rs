// src/cli/mirror.rs
//! Mirror command variants

use clap::Subcommand;

#[derive(Subcommand)]
pub enum MirrorCommands {
    /// Mirror all enabled repositories
    All,

    /// Mirror enabled repositories with the given repository IDs
    Repository {
        /// Repository IDs (space or comma separated)
        ids: Vec<String>,
    },

    /// Mirror enabled repositories of the given products
    ///
    /// A product is given by its ID or as identifier/version[/arch],
    /// for example SLES/15.5/x86_64.
    Product {
        /// Product IDs or identifier/version[/arch] targets
        ids: Vec<String>,
    },
}
