//! Request identity resolution.
//!
//! Turns the raw `Authorization` header of one request into the caller's
//! identity. Requests without a bearer token are anonymous; requests with a
//! bad token are rejected before they reach any workflow.

use std::sync::Arc;
use tracing::debug;

use crate::constants::auth::BEARER_PREFIX;
use crate::db::Store;
use crate::domain::CallerIdentity;
use crate::services::auth_service::AuthError;
use crate::services::token::TokenService;

pub struct IdentityResolver {
    store: Store,
    tokens: Arc<TokenService>,
}

impl IdentityResolver {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Resolves the caller for a request.
    ///
    /// Returns `Ok(None)` when no bearer token is present.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when the token is invalid, expired
    /// or malformed, or names a user that no longer exists.
    pub async fn resolve(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<CallerIdentity>, AuthError> {
        let Some(token) = authorization.and_then(bearer_token) else {
            return Ok(None);
        };

        let claims = self.tokens.validate(token)?;

        let user = self
            .store
            .get_user_by_username(&claims.username)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or_else(|| {
                debug!(username = %claims.username, "Token subject no longer exists");
                AuthError::Unauthorized("User not found".to_string())
            })?;

        Ok(Some(CallerIdentity {
            id: user.id,
            username: claims.username,
            role: claims.role,
        }))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Other schemes yield `None`. An empty token comes back as `Some("")` and
/// is rejected by validation.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix(BEARER_PREFIX).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_strips_prefix() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), Some(""));
    }

    #[test]
    fn other_schemes_are_anonymous() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token(""), None);
    }
}
