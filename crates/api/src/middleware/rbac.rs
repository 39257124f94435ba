//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests from the other
//! role with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use talent_core::error::CoreError;
use talent_core::roles::{ROLE_AGENT, ROLE_CLIENT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `agent` role.
///
/// ```ignore
/// async fn roster(RequireAgent(agent): RequireAgent) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAgent(pub AuthUser);

impl FromRequestParts<AppState> for RequireAgent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_AGENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Agent role required".into(),
            )));
        }
        Ok(RequireAgent(user))
    }
}

/// Requires the `client` role.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_CLIENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Client role required".into(),
            )));
        }
        Ok(RequireClient(user))
    }
}
