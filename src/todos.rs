/// Todo store
///
/// The representative domain resource behind the authentication gate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, StoreError};

#[derive(Debug, Clone)]
pub struct TodoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, params: NewTodo) -> Result<TodoRecord, AppError>;

    /// All todos for a user, ordered by date.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, AppError>;

    /// Delete a todo owned by `user_id`. Unknown ID or foreign owner is a
    /// not-found error.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError>;
}

/// Postgres-backed todo store.
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type TodoRow = (
    Uuid,
    Uuid,
    DateTime<Utc>,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
);

fn row_to_record(row: TodoRow) -> TodoRecord {
    let (id, user_id, created_at, updated_at, date, title, description) = row;
    TodoRecord {
        id,
        user_id,
        created_at,
        updated_at,
        date,
        title,
        description,
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, params: NewTodo) -> Result<TodoRecord, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO todos (id, user_id, created_at, updated_at, date, title, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(params.user_id)
        .bind(now)
        .bind(now)
        .bind(params.date)
        .bind(&params.title)
        .bind(&params.description)
        .execute(&self.pool)
        .await?;

        Ok(TodoRecord {
            id,
            user_id: params.user_id,
            created_at: now,
            updated_at: now,
            date: params.date,
            title: params.title,
            description: params.description,
        })
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, AppError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, user_id, created_at, updated_at, date, title, description
            FROM todos
            WHERE user_id = $1
            ORDER BY date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Store(StoreError::NotFound("todo".to_string())));
        }

        Ok(())
    }
}

/// In-memory todo store used by the test suite.
#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: Mutex<HashMap<Uuid, TodoRecord>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn create(&self, params: NewTodo) -> Result<TodoRecord, AppError> {
        let mut todos = self
            .todos
            .lock()
            .map_err(|_| AppError::Internal("Todo store lock poisoned".to_string()))?;

        let now = Utc::now();
        let record = TodoRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            created_at: now,
            updated_at: now,
            date: params.date,
            title: params.title,
            description: params.description,
        };
        todos.insert(record.id, record.clone());

        Ok(record)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, AppError> {
        let todos = self
            .todos
            .lock()
            .map_err(|_| AppError::Internal("Todo store lock poisoned".to_string()))?;

        let mut result: Vec<TodoRecord> = todos
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|t| t.date);

        Ok(result)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut todos = self
            .todos
            .lock()
            .map_err(|_| AppError::Internal("Todo store lock poisoned".to_string()))?;

        match todos.get(&id) {
            Some(record) if record.user_id == user_id => {
                todos.remove(&id);
                Ok(())
            }
            _ => Err(AppError::Store(StoreError::NotFound("todo".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_todo(user_id: Uuid, days_out: i64, title: &str) -> NewTodo {
        NewTodo {
            user_id,
            date: Utc::now() + Duration::days(days_out),
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn list_is_ordered_by_date_and_scoped_to_owner() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.create(new_todo(owner, 5, "later")).await.unwrap();
        store.create(new_todo(owner, 1, "sooner")).await.unwrap();
        store.create(new_todo(other, 2, "not mine")).await.unwrap();

        let todos = store.list_for_user(owner).await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].title, "sooner");
        assert_eq!(todos[1].title, "later");
    }

    #[tokio::test]
    async fn delete_requires_ownership() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let todo = store.create(new_todo(owner, 1, "mine")).await.unwrap();

        assert!(store.delete(todo.id, stranger).await.is_err());
        assert!(store.delete(todo.id, owner).await.is_ok());
        assert!(store.delete(todo.id, owner).await.is_err());
    }
}
