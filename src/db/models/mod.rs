// src/db/models/mod.rs

//! Data models for the mirror store
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, and updating records.

mod product;
mod repository;

pub use product::{Product, ProductTarget};
pub use repository::Repository;
