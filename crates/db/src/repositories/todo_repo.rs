//! Repository for the `todos` table.

use sqlx::PgPool;
use talent_core::todo::TODO_STATUS_TODO;
use talent_core::types::DbId;

use crate::models::todo::{CreateTodo, Todo, UpdateTodo};

const COLUMNS: &str = "id, user_id, text, due_date, status, created_at, updated_at";

/// Per-user todos. Every query is scoped to the owning user.
pub struct TodoRepo;

impl TodoRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateTodo,
    ) -> Result<Todo, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (user_id, text, due_date, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .bind(&input.text)
            .bind(input.due_date)
            .bind(input.status.as_deref().unwrap_or(TODO_STATUS_TODO))
            .fetch_one(pool)
            .await
    }

    /// A user's todos, open items with the earliest due date first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Todo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM todos
             WHERE user_id = $1
             ORDER BY (status = 'done'), due_date NULLS LAST, created_at DESC"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `None` if the todo does not exist or belongs to someone else.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateTodo,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET
                text = COALESCE($3, text),
                due_date = COALESCE($4, due_date),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.text)
            .bind(input.due_date)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row owned by `user_id` was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
