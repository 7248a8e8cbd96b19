//! User store: the persistence boundary for user records.
//!
//! The auth core only ever calls [`UserStore::find_by_email`]; creation and
//! listing exist for the CRUD endpoints. [`SqliteUserStore`] is the production
//! implementation; [`mock`] holds in-memory and failing stores for tests.

use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// User model (maps to users table)
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    /// Plaintext secret or bcrypt hash, per the configured secret policy.
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Values for inserting a user. `password` is already in stored form.
#[derive(Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => {
                AuthError::Conflict("An account with this email already exists".to_string())
            }
            StoreError::Unavailable(detail) => AuthError::Database(detail),
        }
    }
}

/// Read/write access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user. Fails with `StoreError::Duplicate` if the email is taken.
    async fn create(&self, record: NewUserRecord) -> Result<User, StoreError>;

    /// All users, ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// SQLite-backed user store.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Connect to `database_url` and apply migrations.
    ///
    /// `sqlite::memory:` URLs get a single long-lived connection, since every
    /// new connection would otherwise open its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to connect to database: {}", e))
            })?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("Failed to fetch user by email: {}", e)))
    }

    async fn create(&self, record: NewUserRecord) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING user_id, name, email, password, created_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate("users.email".to_string())
            }
            _ => StoreError::Unavailable(format!("Failed to create user: {}", e)),
        })
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password, created_at
            FROM users
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("Failed to list users: {}", e)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(format!("Database ping failed: {}", e)))
    }
}

/// Test doubles for [`UserStore`].
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// In-memory store keyed by insertion order.
    #[derive(Default)]
    pub struct InMemoryUserStore {
        users: RwLock<Vec<User>>,
        lookups: AtomicUsize,
    }

    impl InMemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of `find_by_email` calls made.
        pub fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let users = self.users.read().await;
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn create(&self, record: NewUserRecord) -> Result<User, StoreError> {
            let mut users = self.users.write().await;
            if users.iter().any(|u| u.email == record.email) {
                return Err(StoreError::Duplicate("users.email".to_string()));
            }

            let user_id = i64::try_from(users.len() + 1)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let user = User {
                user_id,
                name: record.name,
                email: record.email,
                password: record.password,
                created_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Ok(self.users.read().await.clone())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Store whose every call fails as if the database were unreachable.
    #[derive(Default)]
    pub struct FailingUserStore;

    #[async_trait]
    impl UserStore for FailingUserStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("mock store is down".to_string()))
        }

        async fn create(&self, _record: NewUserRecord) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("mock store is down".to_string()))
        }

        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Err(StoreError::Unavailable("mock store is down".to_string()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("mock store is down".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::mock::InMemoryUserStore;
    use super::*;

    fn record(name: &str, email: &str, password: &str) -> NewUserRecord {
        NewUserRecord {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_create_and_find_by_email() {
        let store = SqliteUserStore::in_memory().await.unwrap();

        let created = store
            .create(record("Alice", "alice@example.com", "pw123"))
            .await
            .unwrap();
        assert_eq!(created.user_id, 1);
        assert_eq!(created.email, "alice@example.com");

        let found = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(found.user_id, created.user_id);
        assert_eq!(found.password, "pw123");
    }

    #[tokio::test]
    async fn test_sqlite_find_missing_returns_none() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        assert!(store
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_sqlite_email_lookup_is_exact() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        store
            .create(record("Alice", "alice@example.com", "pw123"))
            .await
            .unwrap();
        assert!(store
            .find_by_email("alice@example.co")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_sqlite_duplicate_email_is_rejected() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        store
            .create(record("Alice", "alice@example.com", "pw123"))
            .await
            .unwrap();

        let err = store
            .create(record("Other Alice", "alice@example.com", "pw456"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_sqlite_list_is_ordered_by_id() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        store
            .create(record("Bob", "bob@example.com", "b"))
            .await
            .unwrap();
        store
            .create(record("Alice", "alice@example.com", "a"))
            .await
            .unwrap();

        let users = store.list().await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["bob@example.com", "alice@example.com"]);
    }

    #[tokio::test]
    async fn test_sqlite_ping() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_connect_rejects_bad_url() {
        let result = SqliteUserStore::connect("postgres://not-sqlite").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_in_memory_store_duplicate_and_lookup_count() {
        let store = InMemoryUserStore::new();
        store
            .create(record("Alice", "alice@example.com", "pw"))
            .await
            .unwrap();
        assert!(matches!(
            store.create(record("A2", "alice@example.com", "pw")).await,
            Err(StoreError::Duplicate(_))
        ));

        store.find_by_email("alice@example.com").await.unwrap();
        store.find_by_email("bob@example.com").await.unwrap();
        assert_eq!(store.lookup_count(), 2);
    }

    #[test]
    fn test_store_error_maps_to_auth_error() {
        assert!(matches!(
            AuthError::from(StoreError::Duplicate("users.email".to_string())),
            AuthError::Conflict(_)
        ));
        assert!(matches!(
            AuthError::from(StoreError::Unavailable("down".to_string())),
            AuthError::Database(_)
        ));
    }

    #[test]
    fn test_user_debug_redacts_secret_and_email() {
        let user = User {
            user_id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "pw123".to_string(),
            created_at: Utc::now(),
        };
        let debug = format!("{:?}", user);
        assert!(!debug.contains("pw123"));
        assert!(!debug.contains("alice@example.com"));
        assert!(debug.contains("Alice"));
    }
}
