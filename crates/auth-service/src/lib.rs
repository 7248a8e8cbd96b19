//! User Auth Service Library
//!
//! Password sign-in that issues signed, expiring session tokens, and a guard
//! that admits requests carrying a valid token.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Session token codec and user secret comparison
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Access guard for protected routes
//! - `models` - Request and response bodies
//! - `observability` - Metrics and log-safe identifiers
//! - `repositories` - User store
//! - `routes` - Router and application state
//! - `services` - Credential verification, sign-in, user management

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
