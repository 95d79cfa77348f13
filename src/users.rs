/// User store
///
/// The authentication core treats users as an external collaborator: it only
/// reads credentials by email. Registration and profile lookup live here too
/// so the service is usable end to end.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, StoreError};

/// A stored user. `password_hash` never leaves the server.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Parameters for creating a user. The password is already hashed by the
/// caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with a unique violation on duplicate email.
    async fn create(&self, params: NewUser) -> Result<UserRecord, AppError>;

    /// Fetch a user by email (credential lookup at login).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Fetch a user by ID (profile lookup behind the auth gate).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;
}

/// Postgres-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type UserRow = (
    Uuid,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
    String,
);

fn row_to_record(row: UserRow) -> UserRecord {
    let (id, created_at, updated_at, username, email, password_hash) = row;
    UserRecord {
        id,
        created_at,
        updated_at,
        username,
        email,
        password_hash,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, params: NewUser) -> Result<UserRecord, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, created_at, updated_at, username, email, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .bind(&params.username)
        .bind(&params.email)
        .bind(&params.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(UserRecord {
            id,
            created_at: now,
            updated_at: now,
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, created_at, updated_at, username, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, created_at, updated_at, username, email, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }
}

/// In-memory user store used by the test suite.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, params: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| AppError::Internal("User store lock poisoned".to_string()))?;

        if users.values().any(|u| u.email == params.email) {
            return Err(AppError::Store(StoreError::UniqueViolation(
                "email".to_string(),
            )));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self
            .users
            .lock()
            .map_err(|_| AppError::Internal("User store lock poisoned".to_string()))?;

        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let users = self
            .users
            .lock()
            .map_err(|_| AppError::Internal("User store lock poisoned".to_string()))?;

        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "tester".to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$fakehash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_user("a@example.com")).await.unwrap();

        let by_email = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@example.com")).await.unwrap();

        let result = store.create(new_user("a@example.com")).await;
        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::UniqueViolation(_)))
        ));
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let store = InMemoryUserStore::new();
        assert!(store
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
