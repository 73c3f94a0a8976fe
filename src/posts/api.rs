//! Post API Endpoints
//! Mission: Feed posts, likes, and comments for signed-in members

use crate::app::AppState;
use crate::auth::{middleware::AuthUser, models::User};
use crate::error::{ApiError, JsonBody};
use crate::posts::models::{Comment, CommentRemoval, Like, Post, TextRequest};
use crate::validation::Validator;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

const POST_NOT_FOUND: &str = "Post not found";
const NOT_OWNER: &str = "User unauthorized";

fn load_post(state: &AppState, id: &str) -> Result<Post, ApiError> {
    state
        .posts
        .find_by_id(id)?
        .ok_or_else(|| ApiError::NotFound(POST_NOT_FOUND.to_string()))
}

/// Likes and comments are edited inside one store step
fn modify_post<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut Post) -> T,
) -> Result<(Post, T), ApiError> {
    state
        .posts
        .modify(id, f)?
        .ok_or_else(|| ApiError::NotFound(POST_NOT_FOUND.to_string()))
}

/// Name and avatar are copied onto posts and comments at write time
fn author(state: &AppState, auth: &AuthUser) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(&auth.id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Create post - POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    Validator::new()
        .not_empty("text", payload.text.as_deref(), "Post cannot be empty")
        .finish()?;

    let user = author(&state, &auth)?;
    let post = Post::new(
        &user.id,
        payload.text.as_deref().unwrap_or_default(),
        &user.name,
        &user.avatar,
    );
    state.posts.insert(&post)?;

    info!("📝 Post {} created by {}", post.id, user.id);

    Ok(Json(post))
}

/// All posts, newest first - GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.list()?))
}

/// Single post - GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(load_post(&state, &id)?))
}

/// Delete own post - DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post = load_post(&state, &id)?;

    if post.user != auth.id {
        return Err(ApiError::Unauthorized(NOT_OWNER.to_string()));
    }

    state.posts.delete(&post.id)?;

    info!("🗑️  Post {} removed", post.id);

    Ok(Json(json!({ "msg": "Post removed" })))
}

/// Like or unlike - PUT /api/posts/like/:id
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let (post, _) = modify_post(&state, &id, |post| post.toggle_like(&auth.id))?;

    Ok(Json(post.likes))
}

/// Comment on a post - POST /api/posts/comment/:id
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<TextRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Validator::new()
        .not_empty("text", payload.text.as_deref(), "Comment cannot be empty")
        .finish()?;

    let user = author(&state, &auth)?;
    let comment = Comment::new(
        &user.id,
        payload.text.as_deref().unwrap_or_default(),
        &user.name,
        &user.avatar,
    );

    let (post, _) = modify_post(&state, &id, |post| post.add_comment(comment))?;

    Ok(Json(post.comments))
}

/// Delete own comment - DELETE /api/posts/comment/:id/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let (post, removal) =
        modify_post(&state, &id, |post| post.remove_comment(&comment_id, &auth.id))?;

    removal.map_err(|reason| match reason {
        CommentRemoval::NotFound => ApiError::NotFound("Comment not found".to_string()),
        CommentRemoval::NotAuthor => ApiError::Unauthorized(NOT_OWNER.to_string()),
    })?;

    Ok(Json(post.comments))
}
