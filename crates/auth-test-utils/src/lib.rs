//! # Auth Test Utilities
//!
//! Shared test utilities for the auth service.
//!
//! This crate provides:
//! - Fixed fixtures (signing secret, test users)
//! - Test data builders (`TestTokenBuilder`)
//! - Server test harness (`TestAuthServer` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestAuthServer::spawn().await?;
//!     server.create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await?;
//!
//!     let token = server.create_token(ALICE_EMAIL)?;
//!     token.assert_valid_jwt().assert_for_subject(ALICE_EMAIL);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
