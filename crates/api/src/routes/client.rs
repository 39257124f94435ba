use axum::routing::get;
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Routes mounted at `/client` (client only).
///
/// ```text
/// GET /agents   -> list_agents
/// GET /profile  -> get_profile
/// PUT /profile  -> update_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents", get(client::list_agents))
        .route(
            "/profile",
            get(client::get_profile).put(client::update_profile),
        )
}
