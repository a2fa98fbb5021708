// src/mirror/mod.rs

//! Repository mirroring
//!
//! The orchestration core lives here:
//! - [`controller`]: run entry points (`mirror all|repository|product`)
//! - [`lock`]: run-scoped exclusive lock
//! - [`resolver`]: repository/product target resolution
//! - [`convergence`]: re-query loop over the eligible set
//! - [`invoker`]: per-repository invocation with failure isolation
//! - [`report`]: end-of-run error aggregation
//!
//! The store and the transfer engine are behind the [`RepositoryStore`] and
//! [`MirrorEngine`] traits, with [`SqliteStore`] and [`HttpMirrorEngine`] as
//! the default implementations.

pub mod controller;
pub mod convergence;
pub mod engine;
pub mod http;
pub mod invoker;
pub mod lock;
pub mod repodata;
pub mod report;
pub mod resolver;
pub mod store;

pub use controller::{RunController, RunOptions};
pub use convergence::{BatchStats, ProcessedSet};
pub use engine::{MirrorEngine, MirrorError, local_path_for_url};
pub use http::HttpMirrorEngine;
pub use invoker::{MirrorInvoker, MirrorOutcome};
pub use lock::{MIRROR_LOCK_KEY, RunLock, with_lock};
pub use report::ErrorReport;
pub use resolver::{Resolution, clean_target_input};
pub use store::{ProductDescriptor, RepositoryStore, SqliteStore};
