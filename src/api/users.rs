use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::Role;
use crate::models::user::NewUser;
use crate::services::UserError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(msg) => Self::NotFound(format!("User not found: {msg}")),
            UserError::DuplicateUsername(name) => {
                Self::Conflict(format!("Username already taken: {name}"))
            }
            UserError::DuplicateEmail(email) => {
                Self::Conflict(format!("Email already registered: {email}"))
            }
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /users
/// Public registration. Accounts created here always get the USER role.
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let Json(payload) = payload?;

    let user = state
        .shared
        .user_service
        .register(NewUser {
            username: payload.username.trim().to_string(),
            email: payload.email.trim().to_string(),
            password: payload.password,
            role: Role::User,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(_caller): CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Path(id) = id?;
    let id = validate_id(id, "user")?;

    let user = state.shared.user_service.get(id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// GET /users/email/{email}
pub async fn get_user_by_email(
    State(state): State<Arc<AppState>>,
    CurrentUser(_caller): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let email = validate_required(&email, "email")?;

    let user = state.shared.user_service.get_by_email(email).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
