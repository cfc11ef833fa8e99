// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the live account record behind the bearer token
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Principal};
use crate::state::AppState;

/// Extractor for authenticated principals.
///
/// Rejects with `401` when the bearer token is missing or invalid, or the
/// account is gone, and `403` when the account is disabled.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.gate().resolve(&parts.headers).map(Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::Request;

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_resolves_registered_principal() {
        let (state, _temp_dir) = test_state();
        let hash = state.gate().hasher().hash("s3cret!!").unwrap();
        let alice = state
            .principals()
            .create("alice", "alice@example.com", hash)
            .unwrap();
        let token = state.gate().issue_token(&alice).unwrap();

        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.username, "alice");
    }
}
