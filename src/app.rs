//! Router assembly and shared application state.

use crate::auth::{api as auth_api, auth_middleware, TokenCodec, UserStore};
use crate::config::TokenTtls;
use crate::middleware::request_logging;
use crate::posts::{api as posts_api, PostStore};
use crate::profile::{api as profile_api, GithubClient, ProfileStore};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub profiles: Arc<ProfileStore>,
    pub posts: Arc<PostStore>,
    pub tokens: Arc<TokenCodec>,
    pub github: Arc<GithubClient>,
    pub token_ttls: TokenTtls,
}

/// Build the full API router.
///
/// Private routes sit behind the token gate; public routes do not. Both share
/// paths where the method decides (e.g. `GET /api/profile` is public,
/// `POST /api/profile` is private).
pub fn build_router(state: AppState) -> Router {
    let private_routes = Router::new()
        .route("/api/auth", get(auth_api::current_user))
        .route("/api/profile/me", get(profile_api::my_profile))
        .route(
            "/api/profile",
            post(profile_api::upsert_profile).delete(profile_api::delete_account),
        )
        .route("/api/profile/experience", put(profile_api::add_experience))
        .route(
            "/api/profile/experience/:exp_id",
            delete(profile_api::delete_experience),
        )
        .route("/api/profile/education", put(profile_api::add_education))
        .route(
            "/api/profile/education/:edu_id",
            delete(profile_api::delete_education),
        )
        .route(
            "/api/posts",
            post(posts_api::create_post).get(posts_api::list_posts),
        )
        .route(
            "/api/posts/:id",
            get(posts_api::get_post).delete(posts_api::delete_post),
        )
        .route("/api/posts/like/:id", put(posts_api::toggle_like))
        .route("/api/posts/comment/:id", post(posts_api::add_comment))
        .route(
            "/api/posts/comment/:id/:comment_id",
            delete(posts_api::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/users", post(auth_api::register))
        .route("/api/auth", post(auth_api::login))
        .route("/api/profile", get(profile_api::list_profiles))
        .route(
            "/api/profile/user/:user_id",
            get(profile_api::profile_by_user),
        )
        .route(
            "/api/profile/github/:username",
            get(profile_api::github_repos),
        );

    Router::new()
        .merge(public_routes)
        .merge(private_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "API running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
