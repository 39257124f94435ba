//! Handlers for the `/agent` resource.

use axum::extract::State;
use axum::Json;
use talent_db::models::user::ConnectedUser;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAgent;
use crate::services::RepresentationService;
use crate::state::AppState;

/// GET /api/agent/clients
///
/// Clients the agent actively represents.
pub async fn list_clients(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ConnectedUser>>> {
    let clients = RepresentationService::connected_clients(&state.pool, agent.user_id).await?;
    Ok(Json(clients))
}
