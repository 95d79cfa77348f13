/// Authentication module
///
/// Handles JWT token generation/validation, password hashing,
/// refresh token generation, and the login/refresh/revoke service.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::Claims;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use service::AuthService;
pub use service::LoginOutcome;
