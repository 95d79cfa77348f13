/// Authentication Service
///
/// Orchestrates login (verify credential, issue tokens, persist refresh
/// record), refresh (validate stored record, issue a new access token) and
/// revoke. The signing settings are injected at construction; nothing here
/// is global.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::session::{RefreshTokenRecord, SessionStore};
use crate::users::{UserRecord, UserStore};

pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    jwt: JwtSettings,
}

/// Result of a successful login: both tokens plus the authenticated user.
pub struct LoginOutcome {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        jwt: JwtSettings,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt,
        }
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Authenticate with email and password, issue an access token and a
    /// fresh refresh token, and persist the refresh record.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials` so
    /// the response cannot be used for account enumeration. A failed store
    /// write fails the whole login; the caller may retry it.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        // bcrypt is deliberately expensive; keep it off the async workers.
        let password = password.to_string();
        let password_hash = user.password_hash.clone();
        let password_valid = tokio::task::spawn_blocking(move || {
            verify_password(&password, &password_hash)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))??;

        if !password_valid {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let access_token = generate_access_token(&user.id, &self.jwt)?;
        let refresh_token = generate_refresh_token();

        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: refresh_token.clone(),
            user_id: user.id,
            issued_at: now,
            expires_at: now + Duration::seconds(self.jwt.refresh_token_expiry),
            revoked_at: None,
        };
        self.sessions.create(&record).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a stored refresh token for a new access token.
    ///
    /// A record is `ACTIVE` until revoked (explicit, absorbing) or expired
    /// (time-driven, checked here rather than by a background sweep).
    /// Revocation wins over expiry. The refresh token itself is not rotated;
    /// it stays valid until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let record = self
            .sessions
            .lookup(refresh_token)
            .await?
            .ok_or(AppError::Auth(AuthError::RefreshNotFound))?;

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AppError::Auth(AuthError::RefreshRevoked));
        }

        if record.expires_at < Utc::now() {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AppError::Auth(AuthError::RefreshExpired));
        }

        generate_access_token(&record.user_id, &self.jwt)
    }

    /// Permanently invalidate a refresh-token record.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.sessions.revoke(refresh_token).await
    }
}
