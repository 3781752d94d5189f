//! API Middleware
//!
//! Middleware layers for authentication, authorization, and request processing.

pub mod auth;

pub use auth::{require_admin, require_auth, require_master, AuthUser, JwtState};
