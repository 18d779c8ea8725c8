use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;

/// Claims
///
/// Payload carried inside every admin bearer token. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the admin username.
    pub sub: String,
    /// Issued At.
    pub iat: i64,
    /// Expiration Time. The token is rejected from this instant on.
    pub exp: i64,
}

/// TokenError
///
/// The guard collapses both rejection variants into one unauthorized outcome; they stay
/// distinct here so logs and tests can tell a forged token from a stale one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, malformed structure or undecodable claims.
    #[error("invalid token")]
    Invalid,
    /// Signature is valid but the current time is at or past `exp`.
    #[error("token expired")]
    Expired,
    #[error("failed to encode token: {0}")]
    Encode(String),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// TokenService
///
/// Issues and verifies HS256-signed admin tokens. The signing secret is fixed at
/// construction and shared read-only by every clone; building a service with a new
/// secret invalidates everything signed with the old one.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `verify_at` against an explicit clock with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
            }),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl())
    }

    /// Lifetime applied by [`TokenService::issue_default`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.ttl)
    }

    /// Issues a token as if the wall clock read `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies `token` against the wall clock and returns its subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the wall clock read `now`.
    ///
    /// The signature is checked before expiry, so a tampered token is always `Invalid`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"unit-test-secret";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(30))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn round_trip_recovers_subject() {
        let tokens = service();
        let token = tokens.issue_default("xliunx").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "xliunx");
    }

    #[test]
    fn zero_ttl_is_expired_immediately() {
        let tokens = service();
        let token = tokens.issue("xliunx", Duration::zero()).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn expiry_boundary_has_no_leeway() {
        let tokens = service();
        let ttl = Duration::seconds(600);
        let token = tokens.issue_at("xliunx", ttl, t0()).unwrap();

        let just_before = t0() + ttl - Duration::seconds(1);
        assert_eq!(tokens.verify_at(&token, just_before).unwrap(), "xliunx");
        assert_eq!(tokens.verify_at(&token, t0() + ttl), Err(TokenError::Expired));
        assert_eq!(
            tokens.verify_at(&token, t0() + ttl + Duration::days(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn any_single_byte_change_is_rejected_as_invalid() {
        let tokens = service();
        let token = tokens.issue_at("xliunx", Duration::hours(1), t0()).unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(
                tokens.verify_at(&tampered, t0()),
                Err(TokenError::Invalid),
                "byte {i} tampered"
            );
        }
    }

    #[test]
    fn tampered_expired_token_reports_invalid_not_expired() {
        let tokens = service();
        let token = tokens.issue_at("xliunx", Duration::seconds(1), t0()).unwrap();
        let tampered = format!("{token}x");
        let later = t0() + Duration::hours(2);
        assert_eq!(tokens.verify_at(&tampered, later), Err(TokenError::Invalid));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let ours = service();
        let theirs = TokenService::new(b"rotated-secret", Duration::minutes(30));
        let token = theirs.issue_at("xliunx", Duration::hours(1), t0()).unwrap();
        assert_eq!(ours.verify_at(&token, t0()), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service();
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));
        assert_eq!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn claims_carry_issue_and_expiry_times() {
        let tokens = service();
        let token = tokens.issue_at("xliunx", Duration::minutes(5), t0()).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation).unwrap();
        assert_eq!(data.claims.iat, t0().timestamp());
        assert_eq!(data.claims.exp, t0().timestamp() + 300);
    }
}
