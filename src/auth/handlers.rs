use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::{CurrentUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Exchange credentials for a signed token. Unknown usernames and wrong
/// passwords produce the same response, so callers cannot probe for accounts.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = User::find_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(|| {
            warn!(username = %payload.username, "login for unknown username");
            AppError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(username = %payload.username, user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// Create a new account. Only admins may call this; the role string is
/// validated against the fixed set before anything touches the database.
#[instrument(skip(state, payload), fields(caller = %caller.username))]
pub async fn register(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, AppError> {
    caller.require_admin()?;

    if payload.username.is_empty() || payload.password.is_empty() || payload.role.is_empty() {
        return Err(AppError::Validation("Missing fields".to_string()));
    }

    let role = payload.role.parse()?;
    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &hash, role).await?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "user registered");
    Ok(Json(PublicUser::from(&user)))
}
