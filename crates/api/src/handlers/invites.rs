//! Handlers for the `/invites` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAgent;
use crate::services::invitation::{InvitationSummary, InviteRequest, InviteResult};
use crate::services::InvitationService;
use crate::state::AppState;

/// POST /api/invites
///
/// Invite a new or existing client. The magic link is only returned for a
/// newly provisioned client.
pub async fn create(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Json(input): Json<InviteRequest>,
) -> AppResult<(StatusCode, Json<InviteResult>)> {
    let result =
        InvitationService::invite(&state.pool, agent.user_id, &input, &state.config.client_url)
            .await?;
    tracing::info!(
        agent_id = agent.user_id,
        client_id = result.client_id,
        representation_id = result.representation_id,
        is_new_client = result.is_new_client,
        "Client invited"
    );
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/invites
pub async fn list(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InvitationSummary>>> {
    let invitations = InvitationService::list(&state.pool, agent.user_id).await?;
    Ok(Json(invitations))
}
