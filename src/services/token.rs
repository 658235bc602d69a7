//! Signed, stateless session tokens (HS256 JWT).
//!
//! A token carries the username as `sub`, the role claim, and `iat`/`exp`
//! timestamps. Nothing is stored server-side, so a token stays valid until it
//! expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::domain::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => Self::InvalidToken,
            ErrorKind::ExpiredSignature => Self::ExpiredToken,
            _ => Self::MalformedToken,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Builds the service from config, generating a throwaway secret when
    /// none is configured.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        let ttl = Duration::minutes(i64::from(config.token_ttl_minutes));

        if let Some(secret) = &config.jwt_secret {
            return Self::new(secret.as_bytes(), ttl);
        }

        warn!(
            "No JWT secret configured; using a random secret. Issued tokens will not survive a restart"
        );
        Self::new(&generate_secret(), ttl)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, username: &str, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(username, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verifies the signature, then checks expiry against `now`.
    ///
    /// A token is expired from the instant `iat + ttl` is reached.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::ExpiredToken);
        }

        Ok(TokenClaims {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}

fn generate_secret() -> [u8; 32] {
    use rand::Rng;

    rand::rng().random()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(60))
    }

    #[test]
    fn round_trip_returns_issued_identity() {
        let tokens = service();
        for (username, role) in [("alice", Role::User), ("root", Role::Admin)] {
            let issued = tokens.issue(username, role).unwrap();
            let claims = tokens.validate(&issued.token).unwrap();
            assert_eq!(claims.username, username);
            assert_eq!(claims.role, role);
        }
    }

    #[test]
    fn expires_exactly_at_ttl_boundary() {
        let tokens = service();
        let issued_at = Utc::now();
        let issued = tokens.issue_at("alice", Role::User, issued_at).unwrap();
        assert_eq!(issued.expires_at, issued_at + Duration::minutes(60));

        let just_before = issued_at + Duration::minutes(60) - Duration::seconds(1);
        assert!(tokens.validate_at(&issued.token, just_before).is_ok());

        let at_boundary = issued_at + Duration::minutes(60);
        assert_eq!(
            tokens.validate_at(&issued.token, at_boundary),
            Err(TokenError::ExpiredToken)
        );

        let long_after = issued_at + Duration::days(2);
        assert_eq!(
            tokens.validate_at(&issued.token, long_after),
            Err(TokenError::ExpiredToken)
        );
    }

    #[test]
    fn expired_by_wall_clock() {
        let tokens = service();
        let issued = tokens
            .issue_at("alice", Role::User, Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(
            tokens.validate(&issued.token),
            Err(TokenError::ExpiredToken)
        );
    }

    #[test]
    fn foreign_secret_is_invalid() {
        let other = TokenService::new(b"another-secret-another-secret-xx", Duration::minutes(60));
        let issued = other.issue("alice", Role::Admin).unwrap();
        assert_eq!(
            service().validate(&issued.token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn spliced_payload_is_invalid() {
        let tokens = service();
        let alice = tokens.issue("alice", Role::User).unwrap().token;
        let mallory = tokens.issue("mallory", Role::Admin).unwrap().token;

        let alice_parts: Vec<&str> = alice.split('.').collect();
        let mallory_parts: Vec<&str> = mallory.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            alice_parts[0], mallory_parts[1], alice_parts[2]
        );

        assert_eq!(tokens.validate(&forged), Err(TokenError::InvalidToken));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service();
        for input in ["", "not-a-token", "a.b", "a.b.c.d", "!!!.???.###"] {
            assert_eq!(
                tokens.validate(input),
                Err(TokenError::MalformedToken),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn unknown_role_claim_is_malformed() {
        #[derive(Serialize)]
        struct Raw<'a> {
            sub: &'a str,
            role: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Raw {
                sub: "alice",
                role: "SUPERUSER",
                iat: now,
                exp: now + 3600,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(service().validate(&token), Err(TokenError::MalformedToken));
    }

    #[test]
    fn from_config_uses_configured_ttl() {
        let config = SecurityConfig {
            jwt_secret: Some(String::from_utf8(SECRET.to_vec()).unwrap()),
            token_ttl_minutes: 15,
            ..SecurityConfig::default()
        };
        let tokens = TokenService::from_config(&config);
        assert_eq!(tokens.ttl(), Duration::minutes(15));

        let issued = tokens.issue("alice", Role::User).unwrap();
        assert!(service().validate(&issued.token).is_ok());
    }
}
