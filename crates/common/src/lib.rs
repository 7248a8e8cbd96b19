//! Common utilities and types shared across the auth service crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for bearer-token helpers (header parsing, size limits)
pub mod jwt;
