//! # Staffboard Shared Library
//!
//! This crate contains the data layer and domain logic used by the Staffboard
//! API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, JWT tokens, authentication context
//! - `models`: Owner-scoped database models (employees, projects, tasks, salary)
//! - `salary`: Salary listing filters, statistics and export formatting
//! - `board`: Kanban board grouping
//! - `dashboard`: Per-user dashboard statistics
//! - `assistant`: Rule-based chat assistant
//! - `cache`: Per-user view cache invalidated by mutations

pub mod assistant;
pub mod auth;
pub mod board;
pub mod cache;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod salary;

/// Current version of the Staffboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
