//! Profile routes

use account_db::ProfileUpdate;
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::get,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{ProfilesQuery, UpdateProfileRequest, UserResponse};
use super::validation::{validate_email, validate_gender, validate_name, validate_photo};

fn parse_id(id: &str) -> Result<i64, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest("invalid id".to_string()))
}

/// GET /profiles?page=N
async fn list_profiles(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ProfilesQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let page = query.page();
    debug!("User {} listing profiles page {}", caller.id, page);

    let users = state.db.list_users(page, state.users_per_page).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /profile/{id}
async fn get_profile(
    _caller: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;

    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /profile/{id}
async fn update_profile(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;

    if let Some(name) = &request.name {
        validate_name("name", name)?;
    }
    if let Some(surname) = &request.surname {
        validate_name("surname", surname)?;
    }
    if let Some(email) = &request.email {
        validate_email(email)?;
    }
    if let Some(gender) = &request.gender {
        validate_gender(gender)?;
    }
    if let Some(photo) = &request.photo {
        validate_photo(photo)?;
    }

    let update = ProfileUpdate {
        name: request.name,
        surname: request.surname,
        email: request.email,
        gender: request.gender,
        photo: request.photo,
    };
    if update.is_empty() {
        return Err(ApiError::BadRequest("invalid body structure".to_string()));
    }

    debug!("User {} updating profile {}", caller.id, id);

    let user = state
        .db
        .update_profile(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated profile {}", user.id);

    Ok(Json(UserResponse::from(user)))
}

/// Create profile routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profile/{id}", get(get_profile).put(update_profile))
}
