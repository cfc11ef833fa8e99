// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth gate: credential login and per-request principal resolution.
//!
//! ## Flow
//!
//! 1. `POST /v1/auth/login` calls [`AuthGate::authenticate`], then issues a
//!    token for the returned principal
//! 2. Every protected request carries `Authorization: Bearer <token>`
//! 3. [`AuthGate::resolve`] verifies the token and re-reads the principal
//!    from the credential store, so deleting or disabling an account takes
//!    effect on its very next request

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;

use super::{AuthError, PasswordHasher, TokenService, MAX_PASSWORD_BYTES};
use crate::storage::{DocumentStore, Principal, PrincipalRepository};

/// Authenticates logins and resolves bearer tokens to principals.
#[derive(Debug, Clone)]
pub struct AuthGate {
    storage: Arc<DocumentStore>,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl AuthGate {
    pub fn new(storage: Arc<DocumentStore>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            storage,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let principal = if password.len() > MAX_PASSWORD_BYTES {
            None
        } else {
            PrincipalRepository::new(&self.storage)
                .find_by_username(username)
                .map_err(|e| AuthError::Internal(format!("principal lookup: {e}")))?
        };

        let Some(principal) = principal else {
            // Pay for one bcrypt verify so response time does not reveal
            // whether the username exists.
            self.hasher
                .verify_blocking(password.to_string(), self.hasher.dummy_hash())
                .await;
            tracing::info!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = self
            .hasher
            .verify_blocking(password.to_string(), principal.password_hash.clone())
            .await;
        if !verified {
            tracing::info!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if principal.disabled {
            tracing::info!(user_id = %principal.id, "Login by disabled account");
            return Err(AuthError::AccountDisabled);
        }

        tracing::info!(user_id = %principal.id, "Login succeeded");
        Ok(principal)
    }

    /// Issue an access token for a freshly authenticated principal.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.tokens
            .issue_for_account(&principal.username, &principal.id)
    }

    /// Resolve the principal behind a request's bearer token.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::Unauthenticated)?;
        self.resolve_token(token)
    }

    /// Resolve the principal behind a raw token.
    pub fn resolve_token(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify_at(token, Utc::now()).map_err(|e| {
            tracing::debug!(reason = e.error_code(), "Bearer token rejected");
            AuthError::Unauthenticated
        })?;

        let principal = PrincipalRepository::new(&self.storage)
            .find_by_username(&claims.sub)
            .map_err(|e| AuthError::Internal(format!("principal lookup: {e}")))?
            .ok_or(AuthError::PrincipalNotFound)?;

        // A re-registered username is a different account.
        if claims.uid.as_deref() != Some(principal.id.as_str()) {
            return Err(AuthError::PrincipalNotFound);
        }

        if principal.disabled {
            return Err(AuthError::AccountDisabled);
        }

        Ok(principal)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
