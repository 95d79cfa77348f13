use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::configuration::JwtSettings;
use crate::logger::LoggerMiddleware;
use crate::middleware::RequireAuth;
use crate::routes::{
    create_todo, current_user, delete_todo, get_todos, login, logout, ready_check, refresh,
    register, revoke,
};
use crate::session::{PgSessionStore, SessionStore};
use crate::todos::{PgTodoStore, TodoStore};
use crate::users::{PgUserStore, UserStore};

/// The persistence backends the server runs on. Production wires Postgres;
/// the test suite substitutes the in-memory stores.
pub struct AppStores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppStores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            sessions: Arc::new(PgSessionStore::new(pool.clone())),
            todos: Arc::new(PgTodoStore::new(pool)),
        }
    }
}

pub fn run(
    listener: TcpListener,
    stores: AppStores,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let auth_service = web::Data::new(AuthService::new(
        stores.users.clone(),
        stores.sessions.clone(),
        jwt_config.clone(),
    ));
    let users = web::Data::from(stores.users);
    let todos = web::Data::from(stores.todos);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(auth_service.clone())
            .app_data(users.clone())
            .app_data(todos.clone())

            // Public routes (no authentication required)
            .route("/api/ready", web::get().to(ready_check))
            .route("/api/users", web::post().to(register))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/logout", web::post().to(logout))

            // Protected routes (require a valid access-token cookie)
            .service(
                web::scope("/api")
                    .wrap(RequireAuth::new(jwt_config.clone()))
                    .route("/me", web::get().to(current_user))
                    .route("/todos", web::post().to(create_todo))
                    .route("/todos", web::get().to(get_todos))
                    .route("/todos/{todo_id}", web::delete().to(delete_todo)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
