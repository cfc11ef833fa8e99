// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for all storage operations.
//!
//! Every read, update and delete of an owned record must pass through these
//! checks. Existence is always checked before ownership, so a missing record
//! reports `NotFound` and an existing foreign record reports `Forbidden`
//! without its contents leaving the repository.

use crate::auth::Principal;

use super::repository::{RepoError, RepoResult};

/// Trait for records that have an owner.
pub trait OwnedResource {
    /// Username of the owning principal.
    fn owner(&self) -> &str;

    /// Human-readable resource label used in error messages.
    fn resource_label(&self) -> &'static str;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the principal owns this record.
    ///
    /// # Errors
    /// Returns `RepoError::Forbidden` if the principal doesn't own it.
    fn verify_ownership(&self, principal: &Principal) -> RepoResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, principal: &Principal) -> RepoResult<()> {
        if self.owner() == principal.username {
            Ok(())
        } else {
            Err(RepoError::Forbidden {
                resource: self.resource_label(),
            })
        }
    }
}

/// Ownership check over an optional lookup result.
pub trait OwnershipCheck<T> {
    /// Verify existence, then ownership, and return the record if authorized.
    fn verify_owner(self, principal: &Principal, resource: &'static str) -> RepoResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, principal: &Principal, resource: &'static str) -> RepoResult<T> {
        match self {
            Some(record) => {
                record.verify_ownership(principal)?;
                Ok(record)
            }
            None => Err(RepoError::NotFound { resource }),
        }
    }
}
