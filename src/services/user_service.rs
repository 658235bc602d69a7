//! Domain service for user registration and lookup.

use thiserror::Error;

use crate::models::user::{NewUser, User};

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new account. The password is stored only as a salted hash.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] for malformed input and
    /// [`UserError::DuplicateUsername`] / [`UserError::DuplicateEmail`] when
    /// the unique keys are taken.
    async fn register(&self, new_user: NewUser) -> Result<User, UserError>;

    /// Gets a user by id.
    async fn get(&self, id: i32) -> Result<User, UserError>;

    /// Gets a user by email.
    async fn get_by_email(&self, email: &str) -> Result<User, UserError>;
}
