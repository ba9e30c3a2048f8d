//! User directory: the store holding local user records.
//!
//! `username` and `email` uniqueness is enforced by the store at write
//! time; `create` is insert-or-conflict, never check-then-create.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use thiserror::Error;

use crate::models::User;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("user directory unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, DirectoryError>;

    async fn create(&self, user: User) -> Result<User, DirectoryError>;
}

/// PostgreSQL-backed directory.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DirectoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn create(&self, user: User) -> Result<User, DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, first_name, last_name, registration_method, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.registration_method)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user)
    }
}

fn map_sqlx_error(err: sqlx::Error) -> DirectoryError {
    if let sqlx::Error::Database(db_err) = &err {
        // 23505 = unique_violation
        if db_err.code().as_deref() == Some("23505") {
            return DirectoryError::Duplicate(db_err.message().to_string());
        }
    }
    DirectoryError::Unavailable(anyhow::anyhow!(err))
}

/// In-memory directory for tests and local development. A single mutex
/// guards both uniqueness maps, so `create` observes and updates them
/// atomically.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    users_by_email: HashMap<String, User>,
    usernames: HashSet<String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.users_by_email.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| DirectoryError::Unavailable(anyhow::anyhow!("mutex poisoned: {}", e)))?;
        Ok(inner.users_by_email.get(&email.to_lowercase()).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DirectoryError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| DirectoryError::Unavailable(anyhow::anyhow!("mutex poisoned: {}", e)))?;
        Ok(inner.usernames.contains(username))
    }

    async fn create(&self, user: User) -> Result<User, DirectoryError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| DirectoryError::Unavailable(anyhow::anyhow!("mutex poisoned: {}", e)))?;

        let email_key = user.email.to_lowercase();
        if inner.users_by_email.contains_key(&email_key) {
            return Err(DirectoryError::Duplicate(format!(
                "email already registered: {}",
                user.email
            )));
        }
        if inner.usernames.contains(&user.username) {
            return Err(DirectoryError::Duplicate(format!(
                "username already taken: {}",
                user.username
            )));
        }

        inner.usernames.insert(user.username.clone());
        inner.users_by_email.insert(email_key, user.clone());
        Ok(user)
    }
}
