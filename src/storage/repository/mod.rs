// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! `OwnedRepository<R>` is the single owner-scoped CRUD implementation shared
//! by every portfolio resource type; `PrincipalRepository` is the credential
//! store holding user accounts.

pub mod owned;
pub mod principals;

use thiserror::Error;

use super::StorageError;

pub use owned::{OwnedRepository, Record, Resource};
pub use principals::{
    normalize_email, normalize_username, Principal, PrincipalChanges, PrincipalRepository,
    USERS_COLLECTION,
};

/// Errors raised by repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Payload failed field validation.
    #[error("{0}")]
    Validation(String),
    /// Identifier is not well-formed.
    #[error("Invalid object ID.")]
    InvalidId,
    /// No record with that identifier.
    #[error("{resource} not found.")]
    NotFound { resource: &'static str },
    /// Record exists but belongs to another principal.
    #[error("Not authorized to access this {resource}.")]
    Forbidden { resource: &'static str },
    /// A record with the same uniqueness key already exists.
    #[error("{resource} already exists.")]
    Conflict { resource: &'static str },
    /// Underlying store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Validate and canonicalize a record identifier.
///
/// Runs before any store lookup, so a malformed id never touches the
/// filesystem.
pub fn parse_id(id: &str) -> RepoResult<String> {
    uuid::Uuid::parse_str(id.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| RepoError::InvalidId)
}
