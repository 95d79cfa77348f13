/// Session store module
///
/// Persists refresh-token records and exposes the narrow contract the
/// authentication service depends on. Two implementations: Postgres for the
/// real service and an in-memory map for the test suite.

mod memory;
mod postgres;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// A persisted refresh-token record.
///
/// `token` is unique across all records. A record with `revoked_at` set is
/// permanently invalid regardless of `expires_at`; `expires_at` is always
/// set at creation (a record can never be valid forever).
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Storage contract for refresh-token records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new record. Fails with a unique violation if the token
    /// already exists.
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    /// Fetch a record by its opaque token.
    async fn lookup(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Mark a record revoked. Idempotent: revoking an already-revoked token
    /// succeeds and keeps the original `revoked_at`. An unknown token is a
    /// `RefreshNotFound` error.
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}
