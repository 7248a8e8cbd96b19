use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400;

/// Upper bound on configurable token lifetime (30 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 2_592_000;

/// Signing secrets shorter than this are accepted but logged as weak.
pub const RECOMMENDED_SIGNING_SECRET_BYTES: usize = 32;

/// Default bcrypt cost factor (2^12 iterations).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://users.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// How user secrets are stored and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPolicy {
    /// Stored verbatim and compared for exact equality.
    Plaintext,
    /// Stored as a bcrypt hash and compared with `bcrypt::verify`.
    Bcrypt,
}

impl SecretPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretPolicy::Plaintext => "plaintext",
            SecretPolicy::Bcrypt => "bcrypt",
        }
    }
}

impl FromStr for SecretPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" => Ok(SecretPolicy::Plaintext),
            "bcrypt" => Ok(SecretPolicy::Bcrypt),
            other => Err(ConfigError::InvalidSecretPolicy(other.to_string())),
        }
    }
}

pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// HMAC key for session tokens. Rotating it invalidates every issued token.
    pub signing_secret: SecretBox<Vec<u8>>,
    pub token_ttl: Duration,
    pub secret_policy: SecretPolicy,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("signing_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("secret_policy", &self.secret_policy)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing secret: {0}")]
    InvalidSigningSecret(String),

    #[error("Invalid token TTL: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid secret policy '{0}': expected 'plaintext' or 'bcrypt'")]
    InvalidSecretPolicy(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let signing_secret = vars
            .get("AUTH_SIGNING_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_SIGNING_SECRET".to_string()))?;

        if signing_secret.trim().is_empty() {
            return Err(ConfigError::InvalidSigningSecret(
                "secret must not be empty".to_string(),
            ));
        }

        if signing_secret.len() < RECOMMENDED_SIGNING_SECRET_BYTES {
            tracing::warn!(
                target: "auth.config",
                length = signing_secret.len(),
                recommended = RECOMMENDED_SIGNING_SECRET_BYTES,
                "AUTH_SIGNING_SECRET is shorter than recommended"
            );
        }

        let token_ttl_seconds = match vars.get("AUTH_TOKEN_TTL_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!("'{}' is not a number: {}", raw, e))
            })?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&token_ttl_seconds) {
            return Err(ConfigError::InvalidTokenTtl(format!(
                "must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECONDS, token_ttl_seconds
            )));
        }

        let secret_policy = match vars.get("AUTH_SECRET_POLICY") {
            Some(raw) => raw.parse::<SecretPolicy>()?,
            None => SecretPolicy::Plaintext,
        };

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!("'{}' is not a number: {}", raw, e))
            })?,
            None => DEFAULT_BCRYPT_COST,
        };

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(format!(
                "must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
            )));
        }

        let cors_allowed_origins = vars
            .get("CORS_ALLOWED_ORIGINS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CORS_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Config {
            database_url,
            bind_address,
            signing_secret: SecretBox::new(Box::new(signing_secret.as_bytes().to_vec())),
            token_ttl: Duration::from_secs(token_ttl_seconds),
            secret_policy,
            bcrypt_cost,
            cors_allowed_origins,
        })
    }

    /// Raw signing secret bytes for constructing the token codec.
    pub fn signing_secret_bytes(&self) -> &[u8] {
        self.signing_secret.expose_secret().as_slice()
    }
}
