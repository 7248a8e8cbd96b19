//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the workspace. Anything that
//! is a credential goes through these: user passwords submitted at sign-in,
//! the HMAC signing secret, and bearer tokens held by test clients.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct that derives `Debug` while holding one of them is safe to log.
//! Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct SignIn {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let req = SignIn {
//!     email: "alice@example.com".to_string(),
//!     password: SecretString::from("pw123"),
//! };
//!
//! assert!(!format!("{req:?}").contains("pw123"));
//! assert_eq!(req.password.expose_secret(), "pw123");
//! ```
//!
//! With the `serde` feature of `secrecy` enabled, `SecretString` can be
//! deserialized straight out of a JSON request body.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
