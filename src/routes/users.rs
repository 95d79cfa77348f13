/// User Routes
///
/// Registration (the producer of the credential the login flow verifies)
/// and the current-user endpoint behind the authentication gate.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::hash_password;
use crate::error::{AppError, StoreError};
use crate::middleware::AuthenticatedUser;
use crate::users::{NewUser, UserRecord, UserStore};
use crate::validators::{is_valid_email, is_valid_password, is_valid_username};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Public profile of a user; never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserResponse {
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// POST /api/users
///
/// Register a new user with username, email, and password.
///
/// # Errors
/// - 400: Validation errors (invalid email, empty username, short password)
/// - 409: Email already registered
/// - 500: Internal server error
pub async fn register(
    form: web::Json<RegisterRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;
    is_valid_password(&form.password)?;

    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse::from_record(&user)))
}

/// GET /api/me
///
/// Current authenticated user's profile. The identity comes from the
/// authentication gate; a missing user for a valid token means the account
/// was deleted after the token was issued.
///
/// # Errors
/// - 401: Missing or invalid token (handled by the gate)
/// - 404: User no longer exists
pub async fn current_user(
    identity: web::ReqData<AuthenticatedUser>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Store(StoreError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(UserResponse::from_record(&user)))
}
