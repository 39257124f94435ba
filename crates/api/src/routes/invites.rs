use axum::routing::get;
use axum::Router;

use crate::handlers::invites;
use crate::state::AppState;

/// Routes mounted at `/invites` (agent only).
///
/// ```text
/// GET  /  -> list
/// POST /  -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(invites::list).post(invites::create))
}
