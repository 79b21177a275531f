/// Middleware for the API server
///
/// - `security`: Security response headers
/// - `auth`: Bearer token authentication for the `/v1` data routes

pub mod auth;
pub mod security;
