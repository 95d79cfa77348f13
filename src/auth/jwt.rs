/// JWT Token Generation and Validation
///
/// Access tokens are stateless: any holder of the signing secret can verify
/// them without a store lookup, which is why they are short-lived.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Generate a new access token for a user
///
/// Claims are `{iss, sub, iat, exp}` with `exp = now + access_token_expiry`,
/// signed HS256 with the shared secret.
///
/// # Errors
/// Returns error if token generation fails
pub fn generate_access_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, config.access_token_expiry, config.issuer.clone());

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its subject
///
/// Expiry is checked with zero leeway against the current time. The issuer
/// must match configuration and `exp`/`iss`/`sub` must all be present.
///
/// # Errors
/// * `TokenExpired` - `exp` has passed
/// * `TokenSignatureInvalid` - signed with a different secret or tampered
/// * `TokenMalformed` - anything else (bad structure, wrong issuer, bad subject)
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
            _ => AuthError::TokenMalformed,
        }
    })?;

    data.claims.user_id()
}
