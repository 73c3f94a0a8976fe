//! Profile API Endpoints
//! Mission: Create, read, and edit member profiles

use crate::app::AppState;
use crate::auth::{middleware::AuthUser, models::UserSummary};
use crate::error::{ApiError, JsonBody};
use crate::profile::{
    github::GithubError,
    models::{
        new_entry_id, non_empty, parse_date, Education, EducationRequest, Experience,
        ExperienceRequest, Profile, ProfileRequest, ProfileView,
    },
};
use crate::validation::Validator;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::info;

const PROFILE_MISSING: &str = "Profile doesn't exist";

/// Attach the owner's name and avatar
fn view(state: &AppState, profile: Profile) -> Result<ProfileView, ApiError> {
    let owner = state.users.find_by_id(&profile.user_id)?;
    Ok(ProfileView {
        user: UserSummary::new(&profile.user_id, owner.as_ref()),
        profile,
    })
}

fn own_profile(state: &AppState, user_id: &str) -> Result<Profile, ApiError> {
    state
        .profiles
        .find_by_user(user_id)?
        .ok_or_else(|| ApiError::BadRequest(PROFILE_MISSING.to_string()))
}

/// Edit the caller's stored profile in one store step
fn modify_own<T>(
    state: &AppState,
    user_id: &str,
    f: impl FnOnce(&mut Profile) -> T,
) -> Result<(Profile, T), ApiError> {
    state
        .profiles
        .modify(user_id, f)?
        .ok_or_else(|| ApiError::BadRequest(PROFILE_MISSING.to_string()))
}

/// Get own profile - GET /api/profile/me
pub async fn my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = own_profile(&state, &auth.id)?;
    Ok(Json(view(&state, profile)?))
}

/// Create or update own profile - POST /api/profile
pub async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<ProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    Validator::new()
        .not_empty("status", payload.status.as_deref(), "Status is required")
        .not_empty("skills", payload.skills.as_deref(), "Skills is required")
        .finish()?;

    let fields = payload.into_fields();

    let profile = state.profiles.upsert_with(&auth.id, |stored| match stored {
        Some(mut existing) => {
            existing.apply(fields);
            existing
        }
        None => {
            info!("Creating profile for user {}", auth.id);
            Profile::new(&auth.id, fields)
        }
    })?;

    Ok(Json(view(&state, profile)?))
}

/// List all profiles - GET /api/profile
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let profiles = state
        .profiles
        .list()?
        .into_iter()
        .map(|p| view(&state, p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(profiles))
}

/// Profile by user id - GET /api/profile/user/:user_id
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state
        .profiles
        .find_by_user(&user_id)?
        .ok_or_else(|| ApiError::BadRequest("Profile not found".to_string()))?;

    Ok(Json(view(&state, profile)?))
}

/// Delete profile, posts, and account - DELETE /api/profile
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let posts_removed = state.posts.delete_by_user(&auth.id)?;
    state.profiles.delete_by_user(&auth.id)?;
    state.users.delete_user(&auth.id)?;

    info!(
        "🗑️  Account {} deleted ({} posts removed)",
        auth.id, posts_removed
    );

    Ok(Json(json!({ "msg": "User deleted" })))
}

/// Add experience - PUT /api/profile/experience
pub async fn add_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<ExperienceRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let mut v = Validator::new();
    v.not_empty("title", payload.title.as_deref(), "Title is required")
        .not_empty("company", payload.company.as_deref(), "Company is required")
        .not_empty("from", payload.from.as_deref(), "From date is required");
    let (from, to) = entry_dates(&mut v, payload.from.as_deref(), payload.to.as_deref());
    v.finish()?;

    let entry = Experience {
        id: new_entry_id(),
        title: payload.title.unwrap_or_default().trim().to_string(),
        company: payload.company.unwrap_or_default().trim().to_string(),
        location: non_empty(payload.location),
        from: from.ok_or_else(|| ApiError::BadRequest("From date is required".to_string()))?,
        to,
        current: payload.current.unwrap_or(false),
        description: non_empty(payload.description),
    };

    let profile = modify_own(&state, &auth.id, |profile| profile.add_experience(entry))?.0;

    Ok(Json(view(&state, profile)?))
}

/// Remove experience - DELETE /api/profile/experience/:exp_id
pub async fn delete_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = modify_own(&state, &auth.id, |profile| profile.remove_experience(&exp_id))?.0;

    Ok(Json(view(&state, profile)?))
}

/// Add education - PUT /api/profile/education
pub async fn add_education(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<EducationRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let mut v = Validator::new();
    v.not_empty("college", payload.college.as_deref(), "College is required")
        .not_empty("degree", payload.degree.as_deref(), "Degree is required")
        .not_empty(
            "fieldofstudy",
            payload.fieldofstudy.as_deref(),
            "Field of Study is required",
        )
        .not_empty("from", payload.from.as_deref(), "From date is required");
    let (from, to) = entry_dates(&mut v, payload.from.as_deref(), payload.to.as_deref());
    v.finish()?;

    let entry = Education {
        id: new_entry_id(),
        college: payload.college.unwrap_or_default().trim().to_string(),
        degree: payload.degree.unwrap_or_default().trim().to_string(),
        fieldofstudy: payload.fieldofstudy.unwrap_or_default().trim().to_string(),
        from: from.ok_or_else(|| ApiError::BadRequest("From date is required".to_string()))?,
        to,
        current: payload.current.unwrap_or(false),
        description: non_empty(payload.description),
    };

    let profile = modify_own(&state, &auth.id, |profile| profile.add_education(entry))?.0;

    Ok(Json(view(&state, profile)?))
}

/// Remove education - DELETE /api/profile/education/:edu_id
pub async fn delete_education(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = modify_own(&state, &auth.id, |profile| profile.remove_education(&edu_id))?.0;

    Ok(Json(view(&state, profile)?))
}

/// Latest GitHub repos - GET /api/profile/github/:username
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.github.user_repos(&username).await {
        Ok(repos) => Ok(Json(repos)),
        Err(GithubError::NoProfile(_)) => {
            Err(ApiError::NotFound("No Github profile found".to_string()))
        }
        Err(GithubError::Upstream(err)) => Err(ApiError::Internal(err)),
    }
}

/// Parse entry dates, recording a validation error for each bad one.
/// A blank `from` is already reported as missing.
fn entry_dates(
    v: &mut Validator,
    from: Option<&str>,
    to: Option<&str>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let from = from.filter(|s| !s.trim().is_empty());
    let to = to.filter(|s| !s.trim().is_empty());

    let from_date = from.and_then(parse_date);
    v.check(from.is_none() || from_date.is_some(), "from", "From date is invalid");

    let to_date = to.and_then(parse_date);
    v.check(to.is_none() || to_date.is_some(), "to", "To date is invalid");

    (from_date, to_date)
}
