use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use thiserror::Error;

use crate::{
    error::ApiError,
    models::AdminIdentity,
    repository::{RepositoryError, RepositoryState},
};

pub mod password;
pub mod token;

pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};

/// Why a token did not resolve to an admin. Kept for logs and tests only.
#[derive(Debug, Error)]
pub enum UnauthorizedReason {
    #[error(transparent)]
    Token(#[from] TokenError),
    /// The token verified but its subject has no admin record.
    #[error("subject no longer exists")]
    UnknownSubject,
}

/// AuthError
///
/// Failure of [`AuthGuard::authenticate`]. The HTTP boundary turns every variant into the
/// same 401 response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),
    #[error("identity lookup failed: {0}")]
    Store(#[from] RepositoryError),
}

impl AuthError {
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized(UnauthorizedReason::Token(TokenError::Expired))
        )
    }
}

/// AuthGuard
///
/// Resolves a raw bearer token to a live admin identity. Constructed from the process-wide
/// token service and store handle; both are read-only after startup, so clones are cheap
/// and need no locking.
#[derive(Clone)]
pub struct AuthGuard {
    tokens: TokenService,
    repo: RepositoryState,
}

impl AuthGuard {
    pub fn new(tokens: TokenService, repo: RepositoryState) -> Self {
        Self { tokens, repo }
    }

    /// authenticate
    ///
    /// 1. Token verification: signature first, then expiry.
    /// 2. Store lookup of the subject. A missing account is final, never retried:
    ///    it may have been removed after the token was issued.
    pub async fn authenticate(&self, raw_token: &str) -> Result<AdminIdentity, AuthError> {
        let subject = self
            .tokens
            .verify(raw_token)
            .map_err(|e| AuthError::Unauthorized(e.into()))?;

        self.repo
            .find_admin(&subject)
            .await?
            .ok_or(AuthError::Unauthorized(UnauthorizedReason::UnknownSubject))
    }
}

/// AuthAdmin Extractor
///
/// Wraps the identity resolved by [`AuthGuard`]. Using it as a handler argument (or in the
/// admin middleware) makes the route reject any request without a valid
/// `Authorization: Bearer <token>` header.
///
/// Rejection: `ApiError::Unauthorized` (401) for every failure. The reason is logged, never
/// returned.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub AdminIdentity);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    AuthGuard: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = AuthGuard::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| {
                tracing::debug!("missing or malformed Authorization header");
                ApiError::Unauthorized
            })?;

        match guard.authenticate(token).await {
            Ok(admin) => Ok(AuthAdmin(admin)),
            Err(AuthError::Store(e)) => {
                tracing::error!("admin lookup failed during authentication: {}", e);
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                tracing::warn!("rejected admin token: {}", e);
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Extracts the credential from `Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
