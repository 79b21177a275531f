/// API route handlers
///
/// Public:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh
/// - `diagnostics`: Database connectivity and configuration checks
///
/// Authenticated (action envelope responses):
///
/// - `dashboard`: Summary counts
/// - `employees`, `projects`, `tasks`, `assignments`: Owner-scoped CRUD
/// - `board`: Kanban board
/// - `salary`: Salary records, listing and export
/// - `assistant`: HR assistant

pub mod assignments;
pub mod assistant;
pub mod auth;
pub mod board;
pub mod dashboard;
pub mod diagnostics;
pub mod employees;
pub mod health;
pub mod projects;
pub mod salary;
pub mod tasks;
