//! Authentication API Endpoints
//! Mission: Provide registration, login, and current-user endpoints

use crate::app::AppState;
use crate::auth::{
    middleware::AuthUser,
    models::{LoginRequest, RegisterRequest, TokenResponse, User},
    user_store::UserStoreError,
};
use crate::error::{ApiError, JsonBody};
use crate::validation::Validator;
use axum::{extract::State, Json};
use tracing::{info, warn};

const USER_EXISTS: &str = "User already exists, please log in";
const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Register endpoint - POST /api/users
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Validator::new()
        .not_empty("name", payload.name.as_deref(), "Please enter your name")
        .email(
            "email",
            payload.email.as_deref(),
            "Please enter a valid email id",
        )
        .min_len(
            "password",
            payload.password.as_deref(),
            6,
            "Please enter a password with 6 or more characters",
        )
        .finish()?;

    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if state.users.find_by_email(&email)?.is_some() {
        return Err(ApiError::rejected(USER_EXISTS));
    }

    // The unique index still catches a concurrent registration
    let user = state
        .users
        .create_user(name.trim(), &email, &password)
        .map_err(|e| match e {
            UserStoreError::EmailTaken => ApiError::rejected(USER_EXISTS),
            UserStoreError::Storage(err) => ApiError::Internal(err),
        })?;

    let token = state.tokens.issue(&user.id, state.token_ttls.register)?;

    info!("✅ Registered user {}", user.id);

    Ok(Json(TokenResponse { token }))
}

/// Login endpoint - POST /api/auth
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Validator::new()
        .email(
            "email",
            payload.email.as_deref(),
            "Please enter a valid email id",
        )
        .exists(
            "password",
            payload.password.as_deref(),
            "Please enter the password",
        )
        .finish()?;

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    // Unknown email and wrong password look the same to the caller
    let Some(user) = state.users.verify_password(&email, &password)? else {
        warn!("❌ Failed login attempt");
        return Err(ApiError::rejected(INVALID_CREDENTIALS));
    };

    let token = state.tokens.issue(&user.id, state.token_ttls.login)?;

    info!("✅ Login successful: {}", user.id);

    Ok(Json(TokenResponse { token }))
}

/// Get current user - GET /api/auth
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .find_by_id(&auth.id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
