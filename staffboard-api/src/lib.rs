//! # Staffboard API Server Library
//!
//! HTTP surface of Staffboard: accounts, employees, projects, tasks and the
//! kanban board, salary records with export, the dashboard, and the chat
//! assistant.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and bearer authentication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
