// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed, expiring bearer tokens (HS256 JWT).
//!
//! Verification is a pure computation over the token and the server secret;
//! it never touches storage.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Default access token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject (normalized username)
    pub sub: String,
    /// Account id the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expires at (seconds since epoch)
    pub exp: i64,
}

/// Issues and verifies access tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Lifetime given to tokens issued with [`issue_default`](Self::issue_default).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` using the configured lifetime.
    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, self.ttl)
    }

    /// Issue a token bound to one account: `subject` plus the account id,
    /// using the configured lifetime.
    pub fn issue_for_account(&self, subject: &str, account_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        self.sign(&TokenClaims {
            sub: subject.to_string(),
            uid: Some(account_id.to_string()),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        })
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.sign(&TokenClaims {
            sub: subject.to_string(),
            uid: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Structure is checked before the signature, so any failure after the
    /// token parses is a signature failure. Expiry is checked last: a
    /// tampered expired token reports `BadSignature`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        decode_header(token).map_err(|_| AuthError::Malformed)?;
        jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
            .map_err(|_| AuthError::Malformed)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::BadSignature)?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}
