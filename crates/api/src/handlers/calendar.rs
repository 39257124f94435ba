//! Handlers for the `/calendar` resource.
//!
//! Every response carries local date/time strings in the `timeZone` the
//! caller supplied.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use talent_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::CalendarRangeParams;
use crate::services::calendar::{CalendarEventRequest, CalendarEventView, DaySummary, LocalRange};
use crate::services::CalendarService;
use crate::state::AppState;

impl CalendarRangeParams {
    fn range(&self) -> LocalRange<'_> {
        LocalRange {
            start_date: &self.start_date,
            end_date: &self.end_date,
            time_zone: &self.time_zone,
        }
    }
}

/// GET /api/calendar/events
///
/// Events in the range visible to the requester. With `clientId`, an agent
/// reads that client's calendar.
pub async fn list_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CalendarRangeParams>,
) -> AppResult<Json<Vec<CalendarEventView>>> {
    let owner_id = CalendarService::resolve_owner(&state.pool, auth.user_id, params.client_id).await?;
    let events =
        CalendarService::events_for_calendar(&state.pool, auth.user_id, owner_id, params.range())
            .await?;
    tracing::debug!(count = events.len(), owner_id, "Listed calendar events");
    Ok(Json(events))
}

/// GET /api/calendar/days
///
/// Per-day classification of the same events, one entry per date.
pub async fn list_days(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CalendarRangeParams>,
) -> AppResult<Json<Vec<DaySummary>>> {
    let owner_id = CalendarService::resolve_owner(&state.pool, auth.user_id, params.client_id).await?;
    let days = CalendarService::days(&state.pool, auth.user_id, owner_id, params.range()).await?;
    Ok(Json(days))
}

/// PUT /api/calendar/events
///
/// Create an event on the requester's own calendar.
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CalendarEventRequest>,
) -> AppResult<Json<CalendarEventView>> {
    let created = CalendarService::create(&state.pool, auth.user_id, input).await?;
    Ok(Json(created))
}

/// PATCH /api/calendar/events/{id}
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CalendarEventRequest>,
) -> AppResult<Json<CalendarEventView>> {
    let updated = CalendarService::update(&state.pool, id, auth.user_id, input).await?;
    Ok(Json(updated))
}

/// DELETE /api/calendar/events/{id}
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CalendarService::delete(&state.pool, id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
