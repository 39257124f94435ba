//! Handlers for the `/client` resource: a client's agents and profile.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use talent_core::error::CoreError;
use talent_core::invitation::split_display_name;
use talent_db::models::user::{ConnectedUser, UpdateProfile, UserResponse};
use talent_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::services::RepresentationService;
use crate::state::AppState;

/// Request body for `PUT /client/profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub profile: Option<Value>,
}

/// GET /api/client/agents
///
/// Agents with an active representation of the client.
pub async fn list_agents(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ConnectedUser>>> {
    let agents = RepresentationService::connected_agents(&state.pool, client.user_id).await?;
    Ok(Json(agents))
}

/// GET /api/client/profile
pub async fn get_profile(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state
        .identity_cache
        .get_or_load(&state.pool, client.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: client.user_id,
        }))?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/client/profile
///
/// Rename and/or merge attributes into the profile object.
pub async fn update_profile(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let update = profile_update(input)?;
    let user = UserRepo::update_profile(&state.pool, client.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: client.user_id,
        }))?;
    state.identity_cache.invalidate(client.user_id).await;

    tracing::info!(user_id = client.user_id, "Profile updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// Check the request shape: at least one field, a non-blank name, and a
/// profile object whose values are strings or null.
fn profile_update(input: UpdateProfileRequest) -> Result<UpdateProfile, CoreError> {
    if input.name.is_none() && input.profile.is_none() {
        return Err(CoreError::Validation(
            "Provide a name or profile to update".to_string(),
        ));
    }

    let mut update = UpdateProfile::default();
    if let Some(name) = input.name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("name cannot be blank".to_string()));
        }
        let (first, last) = split_display_name(&name);
        update.first_name = Some(first);
        update.last_name = Some(last);
    }
    if let Some(profile) = input.profile {
        let Value::Object(fields) = &profile else {
            return Err(CoreError::Validation("profile must be an object".to_string()));
        };
        if let Some((key, _)) = fields
            .iter()
            .find(|(_, v)| !matches!(v, Value::String(_) | Value::Null))
        {
            return Err(CoreError::Validation(format!(
                "profile.{key} must be a string or null"
            )));
        }
        update.profile = Some(profile);
    }
    Ok(update)
}
