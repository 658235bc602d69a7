//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::constants::auth::TOKEN_TYPE;
use crate::db::{Store, verify_password};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::token::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

fn record_login(outcome: &'static str) {
    metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let Some((user, password_hash)) = self.store.get_user_credentials(email).await? else {
            record_login("unknown_user");
            return Err(AuthError::UserNotFound(email.to_string()));
        };

        if !verify_password(password_hash, password).await? {
            record_login("invalid_credentials");
            warn!(user_id = user.id, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&user.username, user.role)?;

        record_login("success");
        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(LoginResult {
            token: issued.token,
            token_type: TOKEN_TYPE,
            username: user.username,
            role: user.role,
            expires_at: issued.expires_at,
        })
    }
}
