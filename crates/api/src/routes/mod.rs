pub mod agent;
pub mod auth;
pub mod calendar;
pub mod client;
pub mod health;
pub mod invites;
pub mod roster;
pub mod todos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                    login (public)
/// /auth/register                 register with a registration code (public)
/// /auth/session                  current identity (requires auth)
///
/// /roster                        agent roster (?includeInactive)
/// /roster/{id}                   update, archive
/// /roster/{id}/events            audit trail, log activity
///
/// /invites                       list, invite a client (agent only)
///
/// /calendar/events               range query, create
/// /calendar/events/{id}          update, delete (owner only)
/// /calendar/days                 per-day classification of a range
///
/// /client/agents                 connected agents (client only)
/// /client/profile                get, update (client only)
///
/// /agent/clients                 connected clients (agent only)
///
/// /todos                         list, create
/// /todos/{id}                    update, delete
/// ```
///
/// Response bodies: `/client/profile` and `/todos` wrap their payload in a
/// `{ "data": ... }` envelope ([`crate::response::DataResponse`]). Every other
/// route returns the resource or list as the bare JSON body.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/roster", roster::router())
        .nest("/invites", invites::router())
        .nest("/calendar", calendar::router())
        .nest("/client", client::router())
        .nest("/agent", agent::router())
        .nest("/todos", todos::router())
}
