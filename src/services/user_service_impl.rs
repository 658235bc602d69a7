//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{Store, unique_violation};
use crate::models::user::{NewUser, User};
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        new_user.validate().map_err(UserError::Validation)?;

        if self.store.username_exists(&new_user.username).await? {
            return Err(UserError::DuplicateUsername(new_user.username));
        }
        if self.store.email_exists(&new_user.email).await? {
            return Err(UserError::DuplicateEmail(new_user.email));
        }

        let user = self
            .store
            .create_user(&new_user, &self.security)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some(msg) if msg.contains("email") => {
                    UserError::DuplicateEmail(new_user.email.clone())
                }
                Some(_) => UserError::DuplicateUsername(new_user.username.clone()),
                None => UserError::Database(e.to_string()),
            })?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    async fn get(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound(email.to_string()))
    }
}
