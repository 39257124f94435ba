//! Handlers for the `/auth` resource (login, register, session).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use talent_core::error::CoreError;
use talent_core::invitation::split_display_name;
use talent_core::roles::{validate_role, ROLE_CLIENT};
use talent_db::models::user::{CreateUser, User, UserResponse};
use talent_db::repositories::{UserRepo, WhitelistedEmailRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::services::RepresentationService;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub registration_code: String,
    #[serde(default)]
    pub name: String,
}

/// Successful authentication response returned by login and register.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with username + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(AppError::Core(CoreError::Forbidden(
            "Registration is not complete. Use the link from your invitation.".into(),
        )));
    };

    let password_valid = verify_password(&input.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(auth_response(&state, &user)?))
}

/// POST /api/auth/register
///
/// Complete registration for a whitelisted email. Pending representations
/// of a registering client become active.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::BadRequest)?;

    let entry = WhitelistedEmailRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "This email is not eligible for registration".into(),
            ))
        })?;
    if entry.registration_code != input.registration_code {
        return Err(AppError::BadRequest("Invalid registration code".into()));
    }
    validate_role(&entry.user_type).map_err(|msg| AppError::Core(CoreError::Internal(msg)))?;

    let hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let (first_name, last_name) = split_display_name(&input.name);

    let user = match UserRepo::find_by_username(&state.pool, &input.email).await? {
        Some(existing) if existing.has_password() => {
            return Err(AppError::Core(CoreError::Conflict(
                "This account is already registered".into(),
            )));
        }
        Some(existing) => {
            // Keep the invited name when the form leaves it blank.
            let (first_name, last_name) = if first_name.is_empty() {
                (existing.first_name.clone(), existing.last_name.clone())
            } else {
                (first_name, last_name)
            };
            UserRepo::complete_registration(&state.pool, existing.id, &hash, &first_name, &last_name)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "User",
                    id: existing.id,
                }))?
        }
        None => {
            UserRepo::create(
                &state.pool,
                &CreateUser {
                    username: input.email.clone(),
                    password_hash: Some(hash),
                    role: entry.user_type.clone(),
                    first_name,
                    last_name,
                },
            )
            .await?
        }
    };
    state.identity_cache.invalidate(user.id).await;

    if user.role == ROLE_CLIENT {
        RepresentationService::activate_pending_for_client(&state.pool, user.id).await?;
    }

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// GET /api/auth/session
///
/// The identity behind the bearer token.
pub async fn session(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SessionResponse>> {
    let user = state
        .identity_cache
        .get_or_load(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown session user".into())))?;
    Ok(Json(SessionResponse { user }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = generate_access_token(user.id, &user.role, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}
