//! Route definitions for the `/roster` resource (agent only).

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::roster;
use crate::state::AppState;

/// Routes mounted at `/roster`.
///
/// ```text
/// GET    /              -> list (?includeInactive)
/// PUT    /{id}          -> update
/// DELETE /{id}          -> archive
/// GET    /{id}/events   -> list_events
/// POST   /{id}/events   -> log_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roster::list))
        .route("/{id}", put(roster::update).delete(roster::archive))
        .route(
            "/{id}/events",
            get(roster::list_events).post(roster::log_event),
        )
}
