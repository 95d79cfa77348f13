/// Authentication Routes
///
/// Login, token refresh, revoke, and logout. Tokens travel as HttpOnly
/// cookies; expiry attributes mirror the tokens' own lifetimes.

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::{AppError, AuthError};
use crate::routes::users::UserResponse;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn auth_cookie(name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .max_age(CookieDuration::seconds(max_age_seconds))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish()
}

/// POST /api/login
///
/// Authenticate with email and password. On success returns the user's
/// public profile and sets both token cookies.
///
/// # Errors
/// - 401: Invalid credentials. Unknown email and wrong password produce the
///   same response; nothing in it says which one happened.
/// - 500: Internal server error (hashing or store failure)
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.login(&form.email, &form.password).await?;

    let jwt = service.jwt_settings();
    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            "access_token",
            outcome.access_token,
            jwt.access_token_expiry,
        ))
        .cookie(auth_cookie(
            "refresh_token",
            outcome.refresh_token,
            jwt.refresh_token_expiry,
        ))
        .json(UserResponse::from_record(&outcome.user)))
}

/// POST /api/refresh
///
/// Exchange the refresh-token cookie for a new access-token cookie. The
/// refresh token itself is unchanged and stays valid until its own expiry.
///
/// # Errors
/// - 401: Missing cookie, or the stored record is absent, revoked, or
///   expired. No access-token cookie is set on any failure.
pub async fn refresh(
    req: HttpRequest,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = req
        .cookie("refresh_token")
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let access_token = service.refresh(refresh_token.value()).await?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            "access_token",
            access_token,
            service.jwt_settings().access_token_expiry,
        ))
        .finish())
}

/// POST /api/revoke
///
/// Permanently invalidate the refresh-token record named by the cookie.
///
/// # Errors
/// - 401: Missing cookie or unknown token
pub async fn revoke(
    req: HttpRequest,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = req
        .cookie("refresh_token")
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    service.revoke(refresh_token.value()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/logout
///
/// Best-effort revoke of the refresh record, then expire both cookies.
/// Always returns 200 so a client-side logout succeeds even if the
/// server-side record was already gone.
pub async fn logout(req: HttpRequest, service: web::Data<AuthService>) -> HttpResponse {
    if let Some(refresh_token) = req.cookie("refresh_token") {
        if let Err(e) = service.revoke(refresh_token.value()).await {
            tracing::warn!(error = %e, "Logout revoke skipped");
        }
    }

    HttpResponse::Ok()
        .cookie(expired_cookie("access_token"))
        .cookie(expired_cookie("refresh_token"))
        .finish()
}
