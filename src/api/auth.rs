use axum::{
    Json,
    extract::{FromRequestParts, Request, State, rejection::JsonRejection},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_required;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::CallerIdentity;
use crate::services::{AuthError, LoginResult};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Caller resolved by [`resolve_identity`], `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct ResolvedCaller(pub Option<CallerIdentity>);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound(email) => Self::NotFound(format!("User not found: {email}")),
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::Unauthorized(msg) => Self::Unauthorized(msg),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the bearer token of every request into a [`ResolvedCaller`].
///
/// No `Authorization` header (or a non-Bearer scheme) passes through as
/// anonymous. A bearer token that fails validation ends the request with 401.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(_) => return ApiError::unauthorized("Malformed token").into_response(),
        },
    };

    let caller = match state.shared.identity.resolve(header.as_deref()).await {
        Ok(caller) => caller,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return ApiError::from(e).into_response();
        }
    };

    if let Some(caller) = &caller {
        tracing::Span::current().record("user_id", caller.id);
    }

    request.extensions_mut().insert(ResolvedCaller(caller));
    next.run(request).await
}

// ============================================================================
// Extractors
// ============================================================================

/// Authenticated caller. Rejects anonymous requests with 401.
pub struct CurrentUser(pub CallerIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ResolvedCaller>() {
            Some(ResolvedCaller(Some(caller))) => Ok(Self(caller.clone())),
            _ => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}

/// Caller if one was resolved, `None` for anonymous requests.
pub struct MaybeUser(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ResolvedCaller>()
                .and_then(|resolved| resolved.0.clone()),
        ))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let Json(payload) = payload?;

    let email = validate_required(&payload.email, "email")?;
    validate_required(&payload.password, "password")?;

    let result = state
        .shared
        .auth_service
        .login(email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// GET /auth/me
/// Identity carried by the presented token
pub async fn me(CurrentUser(caller): CurrentUser) -> Json<ApiResponse<CallerIdentity>> {
    Json(ApiResponse::success(caller))
}
