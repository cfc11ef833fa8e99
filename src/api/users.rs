// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! Registration and the user count are public; every other route acts on
//! the caller's own record only.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::resources::MutationResponse,
    auth::{Auth, Principal, MAX_PASSWORD_BYTES},
    error::ApiError,
    resources::{check_email, check_url},
    state::AppState,
    storage::{normalize_username, PrincipalChanges},
};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 5..=25;
const MIN_PASSWORD_CHARS: usize = 8;

/// Body of `POST /v1/users`.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `PATCH /v1/users/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub blog_url: Option<String>,
    pub bio: Option<String>,
    pub disabled: Option<bool>,
}

/// Public view of a principal; never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub disabled: bool,
    pub image_url: String,
    pub github_url: String,
    pub blog_url: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username,
            email: principal.email,
            disabled: principal.disabled,
            image_url: principal.image_url,
            github_url: principal.github_url,
            blog_url: principal.blog_url,
            bio: principal.bio,
            created_at: principal.created_at,
            updated_at: principal.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub total_users: usize,
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let normalized = normalize_username(username);
    let valid = USERNAME_LEN.contains(&normalized.chars().count())
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(ApiError::bad_request(
            "username must be 5 to 25 characters of letters, digits, '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::bad_request(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = MutationResponse),
        (status = 400, description = "Invalid username, e-mail or password"),
        (status = 409, description = "Username or e-mail already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let Json(request) = payload?;

    validate_username(&request.username)?;
    check_email("email", &request.email).map_err(ApiError::bad_request)?;
    validate_password(&request.password)?;

    let hash = state.gate().hasher().hash_blocking(request.password).await?;
    let principal = state
        .principals()
        .create(&request.username, &request.email, hash)?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            message: "User created successfully".to_string(),
            id: principal.id,
        }),
    ))
}

/// Count registered users.
#[utoipa::path(
    get,
    path = "/v1/users/count",
    tag = "Users",
    responses((status = 200, body = CountResponse))
)]
pub async fn count_users(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let total_users = state.principals().count()?;
    Ok(Json(CountResponse { total_users }))
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(principal): Auth) -> Json<UserResponse> {
    Json(principal.into())
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, description = "Malformed identifier"),
        (status = 403, description = "Not the caller's record"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.principals().get(&principal, &id)?;
    Ok(Json(user.into()))
}

/// Update the caller's own record. A new password is re-hashed.
#[utoipa::path(
    patch,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, body = MutationResponse),
        (status = 403, description = "Not the caller's record"),
        (status = 409, description = "E-mail already registered"),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(request) = payload?;

    if let Some(email) = &request.email {
        check_email("email", email).map_err(ApiError::bad_request)?;
    }
    for (field, value) in [
        ("image_url", &request.image_url),
        ("github_url", &request.github_url),
        ("blog_url", &request.blog_url),
    ] {
        if let Some(value) = value {
            check_url(field, value).map_err(ApiError::bad_request)?;
        }
    }

    // Ownership is checked before paying for a bcrypt hash.
    state.principals().get(&principal, &id)?;

    let password_hash = match request.password {
        Some(password) => {
            validate_password(&password)?;
            Some(state.gate().hasher().hash_blocking(password).await?)
        }
        None => None,
    };

    let updated = state.principals().update(
        &principal,
        &id,
        PrincipalChanges {
            email: request.email,
            password_hash,
            image_url: request.image_url,
            github_url: request.github_url,
            blog_url: request.blog_url,
            bio: request.bio,
            disabled: request.disabled,
        },
    )?;

    Ok(Json(MutationResponse {
        message: "User updated successfully".to_string(),
        id: updated.id,
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not the caller's record"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.delete_principal(&principal, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
