// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, RepoCommands};
use conary_mirror::MirrorConfig;
use std::process::ExitCode;

/// Exit status for runs refused before any repository was touched
const EXIT_PRECONDITION: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db_path;

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Mirror { target } => {
            let config = MirrorConfig::load_or_default(cli.config.as_deref())?;
            commands::cmd_mirror(target, &db_path, &config)
        }
        Commands::Repos(RepoCommands::List { all }) => commands::cmd_repos_list(&db_path, all),
        Commands::Repos(RepoCommands::Enable { ids }) => commands::cmd_repos_enable(&db_path, &ids),
        Commands::Repos(RepoCommands::Disable { ids }) => {
            commands::cmd_repos_disable(&db_path, &ids)
        }
        Commands::Import { file } => commands::cmd_import(&file, &db_path),
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<conary_mirror::Error>() {
        Some(e) if e.is_fatal_precondition() => EXIT_PRECONDITION,
        _ => 1,
    }
}
