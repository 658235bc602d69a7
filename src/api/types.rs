use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Role;
use crate::models::post::Post;
use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub slug: Option<String>,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostDto {
    #[must_use]
    pub fn new(post: Post, author_name: Option<String>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            tag: post.tag,
            slug: post.slug,
            author_id: post.author_id,
            author_name,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostUpdateRequest {
    pub title: String,
    pub content: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostIdQuery {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
