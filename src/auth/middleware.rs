//! Authentication Middleware
//! Mission: Protect API endpoints with `x-auth-token` validation
//!
//! Per request the gate either resolves the caller to an [`AuthUser`] and
//! hands over to the next handler, or answers 401 immediately. It never
//! touches the user store; whether the account still exists is up to the
//! handler that needs it.

use crate::auth::token::TokenCodec;
use crate::error::msg_response;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

pub const TOKEN_HEADER: &str = "x-auth-token";

/// Identity resolved by the gate, stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

/// Resolve the caller from request headers.
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthUser, AuthError> {
    let raw = match headers.get(TOKEN_HEADER) {
        None => return Err(AuthError::MissingToken),
        Some(value) => value,
    };

    // A header that is not visible ASCII cannot be one of our tokens
    let token = raw.to_str().map_err(|_| AuthError::InvalidToken)?.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    match codec.verify(token) {
        Ok(id) => Ok(AuthUser { id }),
        Err(reason) => {
            debug!("Rejected token: {}", reason);
            Err(AuthError::InvalidToken)
        }
    }
}

/// Auth middleware that validates the token and injects [`AuthUser`]
pub async fn auth_middleware(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(req.headers(), &codec)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Gate rejections. Invalid and expired tokens share one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "No token, Authorization denied",
            AuthError::InvalidToken => "Token invalid",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        msg_response(StatusCode::UNAUTHORIZED, self.message())
    }
}
