/// Middleware module
///
/// The request-authentication gate protecting the domain routes.

mod require_auth;

pub use require_auth::AuthenticatedUser;
pub use require_auth::RequireAuth;
