//! User Repository
//!
//! Storage seam for user records. Uniqueness of username and email is
//! enforced by the store itself, which makes it the only serialization
//! point between concurrent registrations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewUser, User};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("username or email already exists")]
    Duplicate,

    #[error("repository call timed out")]
    Timeout,

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Duplicate
            }
            _ => RepositoryError::Backend(err.to_string()),
        }
    }
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Create a new user, failing with `Duplicate` if the username or email is taken
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
}

// ============================================
// PostgreSQL
// ============================================

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the users table and its unique indexes
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        tracing::info!("Running user table migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                username VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                college VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);")
            .execute(&self.db)
            .await?;
        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);")
            .execute(&self.db)
            .await?;

        tracing::info!("User table migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, college)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.college)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }
}

// ============================================
// In-memory
// ============================================

#[derive(Default)]
struct MemoryTables {
    users: HashMap<Uuid, User>,
    by_username: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory user repository, for development and tests
#[derive(Default)]
pub struct MemoryUserRepository {
    tables: RwLock<MemoryTables>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, returning whether one existed
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.remove(&id) {
            Some(user) => {
                tables.by_username.remove(&user.username);
                tables.by_email.remove(&user.email);
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.by_username.contains_key(&user.username)
            || tables.by_email.contains_key(&user.email)
        {
            return Err(RepositoryError::Duplicate);
        }

        let row = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            college: user.college,
            created_at: Utc::now(),
        };

        tables.by_username.insert(row.username.clone(), row.id);
        tables.by_email.insert(row.email.clone(), row.id);
        tables.users.insert(row.id, row.clone());

        Ok(row)
    }
}
