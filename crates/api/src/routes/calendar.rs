//! Route definitions for the `/calendar` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// GET    /events       -> list_events (?startDate, endDate, timeZone, clientId)
/// PUT    /events       -> create_event
/// PATCH  /events/{id}  -> update_event (owner only)
/// DELETE /events/{id}  -> delete_event (owner only, soft delete)
/// GET    /days         -> list_days (same query as /events)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(calendar::list_events).put(calendar::create_event),
        )
        .route(
            "/events/{id}",
            patch(calendar::update_event).delete(calendar::delete_event),
        )
        .route("/days", get(calendar::list_days))
}
