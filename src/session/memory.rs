use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AppError, AuthError, StoreError};
use crate::session::{RefreshTokenRecord, SessionStore};

/// In-memory session store used by the test suite.
/// Enforces the same contract as the Postgres store: token uniqueness and
/// first-write-wins revocation.
#[derive(Default)]
pub struct InMemorySessionStore {
    records: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;

        if records.contains_key(&record.token) {
            return Err(AppError::Store(StoreError::UniqueViolation(
                "refresh token".to_string(),
            )));
        }

        records.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;

        Ok(records.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;

        match records.get_mut(token) {
            None => Err(AppError::Auth(AuthError::RefreshNotFound)),
            Some(record) => {
                if record.revoked_at.is_none() {
                    record.revoked_at = Some(Utc::now());
                }
                Ok(())
            }
        }
    }
}
