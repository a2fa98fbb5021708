// src/commands/repo.rs
//! Repository management commands

use anyhow::{Context, Result};
use conary_mirror::db::models::Repository;
use conary_mirror::mirror::clean_target_input;
use tracing::info;

/// List repositories
pub fn cmd_repos_list(db_path: &str, all: bool) -> Result<()> {
    info!("Listing repositories");
    let conn = conary_mirror::db::open(db_path)?;
    let repos = if all {
        Repository::list_all(&conn)?
    } else {
        Repository::list_mirroring_enabled(&conn)?
    };

    if repos.is_empty() {
        println!("No repositories found");
        return Ok(());
    }

    println!("Repositories:");
    for repo in repos {
        let enabled_mark = if repo.mirroring_enabled { "[x]" } else { "[ ]" };
        let mirror_status = repo
            .last_mirrored_at
            .as_ref()
            .map(|ts| format!("mirrored {}", ts))
            .unwrap_or_else(|| "never mirrored".to_string());
        println!(
            "  {} {:>6} {} ({})",
            enabled_mark, repo.external_id, repo.name, mirror_status
        );
        println!("         {}", repo.url);
    }
    Ok(())
}

/// Enable mirroring for repositories
pub fn cmd_repos_enable(db_path: &str, ids: &[String]) -> Result<()> {
    set_mirroring(db_path, ids, true)
}

/// Disable mirroring for repositories
pub fn cmd_repos_disable(db_path: &str, ids: &[String]) -> Result<()> {
    set_mirroring(db_path, ids, false)
}

fn set_mirroring(db_path: &str, ids: &[String], enabled: bool) -> Result<()> {
    let ids = parse_ids(ids)?;
    let verb = if enabled { "Enabled" } else { "Disabled" };

    let mut conn = conary_mirror::db::open(db_path)?;
    conary_mirror::db::transaction(&mut conn, |tx| {
        for id in &ids {
            Repository::set_mirroring_enabled(tx, *id, enabled)?;
        }
        Ok(())
    })?;

    for id in ids {
        info!("{} mirroring of repository {}", verb, id);
        println!("{} mirroring of repository with ID {}", verb, id);
    }
    Ok(())
}

fn parse_ids(raw: &[String]) -> Result<Vec<i64>> {
    let ids = clean_target_input(raw);
    if ids.is_empty() {
        anyhow::bail!("No repository IDs supplied");
    }
    ids.iter()
        .map(|id| {
            id.parse::<i64>()
                .with_context(|| format!("Invalid repository ID '{}'", id))
        })
        .collect()
}
