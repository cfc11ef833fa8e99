// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store: one record per registered principal.
//!
//! This is the only collection holding password material. Usernames and
//! e-mail addresses are unique across the whole service and are enforced
//! through the store's unique-key index, which also serves username lookups
//! at login and on every authenticated request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::{parse_id, RepoError, RepoResult};
use crate::storage::{DocumentStore, OwnedResource, OwnershipCheck, StorageError};

/// Collection holding principal records.
pub const USERS_COLLECTION: &str = "users";

const LABEL: &str = "User";

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub id: String,
    /// NFKC-normalized, lowercase
    pub username: String,
    pub email: String,
    /// bcrypt hash; never leaves the server
    pub password_hash: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub blog_url: String,
    #[serde(default)]
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A principal owns its own record.
impl OwnedResource for Principal {
    fn owner(&self) -> &str {
        &self.username
    }

    fn resource_label(&self) -> &'static str {
        LABEL
    }
}

/// Fields a principal may change on its own record.
///
/// `None` leaves the stored value untouched. The username is deliberately
/// absent: it is the owner key of every record the principal holds.
#[derive(Debug, Clone, Default)]
pub struct PrincipalChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub blog_url: Option<String>,
    pub bio: Option<String>,
    pub disabled: Option<bool>,
}

/// Canonical form of a username: Unicode NFKC, then lowercase.
pub fn normalize_username(username: &str) -> String {
    username.trim().nfkc().collect::<String>().to_lowercase()
}

/// Canonical form of an e-mail address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn username_key(username: &str) -> String {
    format!("username:{username}")
}

fn email_key(email: &str) -> String {
    format!("email:{email}")
}

/// Repository for principal records.
pub struct PrincipalRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> PrincipalRepository<'a> {
    /// Create a new repository over the shared store.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Register a new principal.
    ///
    /// `password_hash` must already be hashed. Username and e-mail are
    /// normalized here; either one being taken is a `Conflict`.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> RepoResult<Principal> {
        let now = Utc::now();
        let principal = Principal {
            id: uuid::Uuid::new_v4().to_string(),
            username: normalize_username(username),
            email: normalize_email(email),
            password_hash,
            disabled: false,
            image_url: String::new(),
            github_url: String::new(),
            blog_url: String::new(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        };

        let username_key = username_key(&principal.username);
        if !self.reserve(&username_key, &principal.id)? {
            return Err(RepoError::Conflict { resource: LABEL });
        }

        let email_key = email_key(&principal.email);
        if !self.reserve(&email_key, &principal.id)? {
            self.release(&username_key, &principal.id);
            return Err(RepoError::Conflict { resource: LABEL });
        }

        if let Err(e) = self
            .storage
            .insert(USERS_COLLECTION, &principal.id, &principal)
        {
            self.release(&username_key, &principal.id);
            self.release(&email_key, &principal.id);
            return Err(e.into());
        }

        tracing::info!(user_id = %principal.id, username = %principal.username, "Principal registered");
        Ok(principal)
    }

    /// Look up a principal by username (normalized before lookup).
    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<Principal>> {
        let username = normalize_username(username);
        let Some(id) = self
            .storage
            .lookup_key(USERS_COLLECTION, &username_key(&username))?
        else {
            return Ok(None);
        };

        // A marker may briefly outlive its document during a delete.
        Ok(self.find(&id)?.filter(|p| p.username == username))
    }

    /// Look up a principal by id without an ownership check.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Principal>> {
        let id = parse_id(id)?;
        self.find(&id)
    }

    /// Fetch a principal record on behalf of `requester`.
    pub fn get(&self, requester: &Principal, id: &str) -> RepoResult<Principal> {
        self.find_by_id(id)?.verify_owner(requester, LABEL)
    }

    /// Apply `changes` to the requester's own record.
    pub fn update(
        &self,
        requester: &Principal,
        id: &str,
        changes: PrincipalChanges,
    ) -> RepoResult<Principal> {
        let current = self.get(requester, id)?;
        let mut updated = current.clone();

        let mut new_email_key = None;
        if let Some(email) = changes.email {
            let email = normalize_email(&email);
            if email != current.email {
                let key = email_key(&email);
                if !self.reserve(&key, &current.id)? {
                    return Err(RepoError::Conflict { resource: LABEL });
                }
                new_email_key = Some(key);
                updated.email = email;
            }
        }

        if let Some(hash) = changes.password_hash {
            updated.password_hash = hash;
        }
        if let Some(image_url) = changes.image_url {
            updated.image_url = image_url;
        }
        if let Some(github_url) = changes.github_url {
            updated.github_url = github_url;
        }
        if let Some(blog_url) = changes.blog_url {
            updated.blog_url = blog_url;
        }
        if let Some(bio) = changes.bio {
            updated.bio = bio;
        }
        if let Some(disabled) = changes.disabled {
            updated.disabled = disabled;
        }
        updated.updated_at = Utc::now();

        if let Err(e) = self
            .storage
            .replace(USERS_COLLECTION, &updated.id, &updated)
        {
            if let Some(key) = &new_email_key {
                self.release(key, &updated.id);
            }
            return Err(match e {
                StorageError::NotFound(_) => RepoError::NotFound { resource: LABEL },
                other => other.into(),
            });
        }

        if new_email_key.is_some() {
            self.release(&email_key(&current.email), &current.id);
        }

        tracing::info!(user_id = %updated.id, "Principal updated");
        Ok(updated)
    }

    /// Delete the requester's own record, then everything it owns, then
    /// free its username and e-mail.
    ///
    /// `purge_owned` removes the owner's records from every resource
    /// collection. It runs after the document is gone, so no new request can
    /// resolve the account, and before the username is released, so nobody
    /// can register the name while records still carry it. If the purge
    /// fails the keys stay held and the error is returned.
    pub fn delete(
        &self,
        requester: &Principal,
        id: &str,
        purge_owned: impl FnOnce(&str) -> RepoResult<usize>,
    ) -> RepoResult<()> {
        let principal = self.get(requester, id)?;

        match self.storage.remove(USERS_COLLECTION, &principal.id) {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => return Err(RepoError::NotFound { resource: LABEL }),
            Err(e) => return Err(e.into()),
        }

        let purged = purge_owned(&principal.username).inspect_err(|e| {
            tracing::error!(user_id = %principal.id, error = %e, "Failed to purge owned records");
        })?;

        self.release(&username_key(&principal.username), &principal.id);
        self.release(&email_key(&principal.email), &principal.id);

        tracing::info!(user_id = %principal.id, purged, "Principal deleted");
        Ok(())
    }

    /// Number of registered principals.
    pub fn count(&self) -> RepoResult<usize> {
        Ok(self.storage.count(USERS_COLLECTION)?)
    }

    fn find(&self, id: &str) -> RepoResult<Option<Principal>> {
        match self.storage.get(USERS_COLLECTION, id) {
            Ok(principal) => Ok(Some(principal)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn reserve(&self, key: &str, holder: &str) -> RepoResult<bool> {
        Ok(self.storage.reserve_key(USERS_COLLECTION, key, holder)?)
    }

    fn release(&self, key: &str, holder: &str) {
        if let Err(e) = self.storage.release_key(USERS_COLLECTION, key, holder) {
            tracing::warn!(user_id = %holder, error = %e, "Failed to release principal key");
        }
    }
}
