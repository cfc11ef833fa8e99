// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error type.
///
/// Token-level failures (`Malformed`, `BadSignature`, `Expired`) come from
/// the token service; the gate reports them to clients as `Unauthenticated`
/// so the response does not reveal which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token could not be parsed
    #[error("Token is malformed.")]
    Malformed,
    /// Token signature does not match
    #[error("Token signature is invalid.")]
    BadSignature,
    /// Token is past its expiry
    #[error("Token has expired.")]
    Expired,
    /// Login failed (unknown username or wrong password)
    #[error("Invalid credentials.")]
    InvalidCredentials,
    /// No usable bearer token on the request
    #[error("Could not validate credentials.")]
    Unauthenticated,
    /// Token subject no longer has an account
    #[error("User no longer exists.")]
    PrincipalNotFound,
    /// Account is suspended
    #[error("Inactive user.")]
    AccountDisabled,
    /// Hashing or lookup failure; the detail is logged, never returned
    #[error("Internal authentication error.")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    detail: String,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Malformed => "malformed_token",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "token_expired",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Malformed
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::Unauthenticated
            | AuthError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials | AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn challenges_bearer(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
            || matches!(self, AuthError::InvalidCredentials)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Authentication failed internally");
        }

        let status = self.status_code();
        let challenge = self.challenges_bearer();
        let body = Json(AuthErrorBody {
            detail: self.to_string(),
            error_code: self.error_code(),
        });

        let mut response = (status, body).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
