/// Todo Routes
///
/// All of these sit behind the authentication gate; the owner comes from the
/// verified identity, never from the request body.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::todos::{NewTodo, TodoRecord, TodoStore};

#[derive(Deserialize)]
pub struct CreateTodoRequest {
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
pub struct TodoResponse {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub date: String,
    pub title: String,
    pub description: String,
}

impl TodoResponse {
    fn from_record(todo: &TodoRecord) -> Self {
        Self {
            id: todo.id.to_string(),
            user_id: todo.user_id.to_string(),
            created_at: todo.created_at.to_rfc3339(),
            updated_at: todo.updated_at.to_rfc3339(),
            date: todo.date.to_rfc3339(),
            title: todo.title.clone(),
            description: todo.description.clone(),
        }
    }
}

/// POST /api/todos
pub async fn create_todo(
    form: web::Json<CreateTodoRequest>,
    identity: web::ReqData<AuthenticatedUser>,
    todos: web::Data<dyn TodoStore>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let todo = todos
        .create(NewTodo {
            user_id: identity.user_id,
            date: form.date,
            title: form.title,
            description: form.description,
        })
        .await?;

    tracing::debug!(user_id = %identity.user_id, todo_id = %todo.id, "Todo created");

    Ok(HttpResponse::Created().json(TodoResponse::from_record(&todo)))
}

/// GET /api/todos
pub async fn get_todos(
    identity: web::ReqData<AuthenticatedUser>,
    todos: web::Data<dyn TodoStore>,
) -> Result<HttpResponse, AppError> {
    let list = todos.list_for_user(identity.user_id).await?;

    let body: Vec<TodoResponse> = list.iter().map(TodoResponse::from_record).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /api/todos/{todo_id}
///
/// # Errors
/// - 404: Unknown todo or owned by someone else
pub async fn delete_todo(
    path: web::Path<Uuid>,
    identity: web::ReqData<AuthenticatedUser>,
    todos: web::Data<dyn TodoStore>,
) -> Result<HttpResponse, AppError> {
    todos.delete(path.into_inner(), identity.user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
