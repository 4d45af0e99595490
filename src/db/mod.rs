//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - A document repository that persists every ledger collection

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
