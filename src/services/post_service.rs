//! Domain service for blog posts.
//!
//! Every mutation takes the caller identity explicitly; updates are gated by
//! [`crate::domain::can_edit`].

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::CallerIdentity;
use crate::models::post::{Post, PostChanges, PostDraft, PostFilter};

/// Errors specific to post operations.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found with id: {0}")]
    NotFound(i32),

    #[error("You don't have permission to {action} this post")]
    NotPermitted { action: &'static str },

    #[error("Title already exists: {0}")]
    DuplicateTitle(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PostError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for posts.
#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    /// Creates a post authored by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Validation`] for field constraint failures and
    /// [`PostError::DuplicateTitle`] when the title is already used.
    async fn create(&self, caller: &CallerIdentity, draft: PostDraft) -> Result<Post, PostError>;

    /// Gets a post by id.
    async fn find(&self, id: i32) -> Result<Post, PostError>;

    /// Lists posts matching every criterion present in `filter`.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, PostError>;

    /// Applies `changes` to an existing post on behalf of `caller`.
    ///
    /// The post id, author and creation time are never modified.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NotFound`] if the post does not exist and
    /// [`PostError::NotPermitted`] if the caller is neither its author nor an admin.
    async fn update(
        &self,
        caller: &CallerIdentity,
        id: i32,
        changes: PostChanges,
    ) -> Result<Post, PostError>;

    /// Resolves author usernames for a batch of posts, keyed by author id.
    async fn author_names(&self, posts: &[Post]) -> Result<HashMap<i32, String>, PostError>;
}
