//! Handlers for the `/roster` resource: an agent's representations and
//! their audit trail.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use talent_core::representation::{RepresentationEventType, RepresentationUpdate};
use talent_core::types::{DbId, Timestamp};
use talent_db::models::representation::{Representation, RosterEntry};
use talent_db::models::representation_event::RepresentationEvent;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAgent;
use crate::query::IncludeInactiveParams;
use crate::services::representation::ActivityLog;
use crate::services::RepresentationService;
use crate::state::AppState;

/// Request body for `POST /roster/{id}/events`.
#[derive(Debug, Deserialize)]
pub struct LogEventRequest {
    #[serde(rename = "type")]
    pub event_type: RepresentationEventType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: Option<Timestamp>,
}

/// GET /api/roster
///
/// Active roster of the agent; `?includeInactive=true` adds pending and
/// inactive representations.
pub async fn list(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<Vec<RosterEntry>>> {
    let entries =
        RepresentationService::roster(&state.pool, agent.user_id, params.include_inactive).await?;
    tracing::debug!(count = entries.len(), "Listed roster");
    Ok(Json(entries))
}

/// PUT /api/roster/{id}
pub async fn update(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RepresentationUpdate>,
) -> AppResult<Json<Representation>> {
    RepresentationService::get_owned(&state.pool, id, agent.user_id).await?;
    let updated = RepresentationService::update(&state.pool, id, &input, agent.user_id).await?;
    Ok(Json(updated))
}

/// DELETE /api/roster/{id}
///
/// Archives the representation; it is never physically removed.
pub async fn archive(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    RepresentationService::get_owned(&state.pool, id, agent.user_id).await?;
    RepresentationService::archive(&state.pool, id, agent.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/roster/{id}/events
///
/// Audit trail, most recent first.
pub async fn list_events(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<RepresentationEvent>>> {
    RepresentationService::get_owned(&state.pool, id, agent.user_id).await?;
    let events = RepresentationService::events(&state.pool, id).await?;
    Ok(Json(events))
}

/// POST /api/roster/{id}/events
///
/// Log a meeting, call, or other manual activity.
pub async fn log_event(
    RequireAgent(agent): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LogEventRequest>,
) -> AppResult<(StatusCode, Json<RepresentationEvent>)> {
    RepresentationService::get_owned(&state.pool, id, agent.user_id).await?;
    let event = RepresentationService::log_activity(
        &state.pool,
        id,
        ActivityLog {
            event_type: input.event_type,
            title: input.title,
            description: input.description,
            date: input.date,
        },
        agent.user_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(event)))
}
