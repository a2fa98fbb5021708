// src/lib.rs

//! Conary Mirror
//!
//! Mirrors package repositories tracked in a local SQLite store.
//!
//! # Architecture
//!
//! - Database-first: repositories, products and mirroring flags live in SQLite
//! - One run at a time: every mirror run holds a file lock for its duration
//! - Convergence: `mirror all` re-queries until no newly enabled repository is left
//! - Failure isolation: a broken repository is reported, never fatal to the run

pub mod compression;
pub mod config;
pub mod db;
mod error;
pub mod hash;
pub mod import;
pub mod mirror;

pub use config::MirrorConfig;
pub use error::{Error, Result};
pub use mirror::{MirrorEngine, MirrorError, RepositoryStore, RunController, RunOptions};
