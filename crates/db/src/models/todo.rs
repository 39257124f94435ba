//! Todo model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use talent_core::types::{DbId, Timestamp};

/// A row from the `todos` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub due_date: Option<Timestamp>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a todo; the owner comes from the session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub text: String,
    pub due_date: Option<Timestamp>,
    pub status: Option<String>,
}

/// DTO for updating a todo. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub text: Option<String>,
    pub due_date: Option<Timestamp>,
    pub status: Option<String>,
}
