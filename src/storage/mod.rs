// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage as plain JSON documents on the local filesystem.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/
//!     {user_id}.json      # Principal (credential store)
//!     _unique/            # username / e-mail index
//!   skills/
//!     {skill_id}.json     # One document per owned record
//!     _unique/            # Per-owner uniqueness markers
//!   projects/ ...         # Same shape for every resource type
//! ```
//!
//! ## Important Notes
//!
//! - One `DocumentStore` is built at startup and shared by every request
//! - Single-document writes are atomic; there are no transactions
//! - Every owned read, update and delete goes through [`ownership`]

pub mod document_store;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use document_store::{DocumentStore, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    normalize_email, normalize_username, OwnedRepository, Principal, PrincipalChanges, PrincipalRepository, Record, RepoError,
    RepoResult, Resource, USERS_COLLECTION,
};
