use axum::routing::get;
use axum::Router;

use crate::handlers::agent;
use crate::state::AppState;

/// Routes mounted at `/agent` (agent only).
///
/// ```text
/// GET /clients  -> list_clients
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/clients", get(agent::list_clients))
}
