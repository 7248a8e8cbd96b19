//! Fixed values shared by tests.

/// Signing secret used by every test server (>= 32 bytes).
pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-0123456789abcdefghij";

/// Token lifetime used by test servers.
pub const TEST_TOKEN_TTL_SECONDS: u64 = 86_400;

pub const ALICE_NAME: &str = "Alice";
pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "pw123";

pub const BOB_NAME: &str = "Bob";
pub const BOB_EMAIL: &str = "bob@example.com";
pub const BOB_PASSWORD: &str = "hunter2";
