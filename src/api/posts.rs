use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::validation::validate_id;
use super::{
    ApiError, ApiResponse, AppState, PostDto, PostIdQuery, PostRequest, PostUpdateRequest,
};
use crate::models::post::{Post, PostChanges, PostDraft, PostFilter};
use crate::services::PostError;

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(id) => Self::not_found("Post", id),
            e @ PostError::NotPermitted { .. } => Self::Forbidden(e.to_string()),
            e @ PostError::DuplicateTitle(_) => Self::Conflict(e.to_string()),
            PostError::Validation(msg) => Self::validation(msg),
            PostError::Database(msg) => Self::DatabaseError(msg),
            PostError::Internal(msg) => Self::internal(msg),
        }
    }
}

async fn to_dtos(state: &AppState, posts: Vec<Post>) -> Result<Vec<PostDto>, ApiError> {
    let names = state.shared.post_service.author_names(&posts).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let author_name = names.get(&post.author_id).cloned();
            PostDto::new(post, author_name)
        })
        .collect())
}

async fn to_dto(state: &AppState, post: Post) -> Result<PostDto, ApiError> {
    let mut dtos = to_dtos(state, vec![post]).await?;
    dtos.pop()
        .ok_or_else(|| ApiError::internal("Post disappeared while loading author"))
}

/// POST /posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PostDto>>), ApiError> {
    let Json(payload) = payload?;

    let post = state
        .shared
        .post_service
        .create(
            &caller,
            PostDraft {
                title: payload.title,
                content: payload.content,
                tag: payload.tag,
            },
        )
        .await?;

    let dto = to_dto(&state, post).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// GET /posts?id={id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(_caller): CurrentUser,
    query: Result<Query<PostIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let Query(query) = query?;
    let id = validate_id(query.id, "post")?;

    let post = state.shared.post_service.find(id).await?;
    Ok(Json(ApiResponse::success(to_dto(&state, post).await?)))
}

/// GET /posts/all
/// Public listing. Every supplied filter must match; none returns everything.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    filter: Result<Query<PostFilter>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let Query(filter) = filter?;

    let posts = state.shared.post_service.list(&filter).await?;
    tracing::debug!(
        count = posts.len(),
        authenticated = caller.is_some(),
        "Listed posts"
    );

    Ok(Json(ApiResponse::success(to_dtos(&state, posts).await?)))
}

/// PUT /posts/{id}
/// Only the author or an admin may edit. The slug follows the new title.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PostUpdateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let Path(id) = id?;
    let id = validate_id(id, "post")?;
    let Json(payload) = payload?;

    let post = state
        .shared
        .post_service
        .update(
            &caller,
            id,
            PostChanges {
                title: payload.title,
                content: payload.content,
                tag: payload.tag,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(to_dto(&state, post).await?)))
}
