mod auth;
mod health_check;
mod todos;
mod users;

pub use auth::{login, logout, refresh, revoke};
pub use health_check::ready_check;
pub use todos::{create_todo, delete_todo, get_todos};
pub use users::{current_user, register};
