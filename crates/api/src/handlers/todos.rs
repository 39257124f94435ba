//! Handlers for the `/todos` resource. Each todo belongs to one user;
//! other users get 404.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use talent_core::error::CoreError;
use talent_core::todo::{validate_todo_status, validate_todo_text};
use talent_core::types::DbId;
use talent_db::models::todo::{CreateTodo, UpdateTodo};
use talent_db::repositories::TodoRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn todo_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Todo", id })
}

/// GET /api/todos
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let todos = TodoRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: todos }))
}

/// POST /api/todos
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> AppResult<impl IntoResponse> {
    validate_todo_text(&input.text)?;
    if let Some(status) = &input.status {
        validate_todo_status(status)?;
    }

    let created = TodoRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(todo_id = created.id, user_id = auth.user_id, "Todo created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/todos/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTodo>,
) -> AppResult<impl IntoResponse> {
    if let Some(text) = &input.text {
        validate_todo_text(text)?;
    }
    if let Some(status) = &input.status {
        validate_todo_status(status)?;
    }

    let updated = TodoRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or_else(|| todo_not_found(id))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/todos/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TodoRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(todo_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
