// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic owner-scoped repository.
//!
//! One implementation of create/get/list/update/delete serves every resource
//! type. A resource type only declares its collection, its uniqueness keys
//! and its field validation; ownership, merge-patch and timestamp rules live
//! here and cannot drift between types.

use std::collections::HashSet;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{parse_id, RepoError, RepoResult};
use crate::auth::Principal;
use crate::storage::{DocumentStore, OwnedResource, OwnershipCheck, StorageError};

/// A portfolio resource type stored in its own collection.
///
/// Implementors hold only the type-specific fields. Every field must be
/// serialized (no `skip_serializing_if`) so that merge-patch can tell which
/// keys belong to the type.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also used as the URL segment.
    const COLLECTION: &'static str;

    /// Label used in client-facing messages.
    const LABEL: &'static str;

    /// Page size applied by `list` when the caller gives none.
    const DEFAULT_LIST_LIMIT: Option<usize> = None;

    /// Uniqueness keys of this record. A create (or an update that changes a
    /// key) conflicts when any key is already held by another record of the
    /// same owner.
    fn unique_keys(&self) -> Vec<String>;

    /// Field-level validation beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Stored envelope around a resource's fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record<R> {
    /// Opaque record identifier (UUID)
    pub id: String,
    /// Username of the owning principal; set once at creation
    pub owner: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
    /// Type-specific fields
    #[serde(flatten)]
    pub data: R,
}

impl<R: Resource> OwnedResource for Record<R> {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn resource_label(&self) -> &'static str {
        R::LABEL
    }
}

/// Owner-scoped CRUD over one resource collection.
pub struct OwnedRepository<'a, R> {
    storage: &'a DocumentStore,
    _resource: PhantomData<R>,
}

impl<'a, R: Resource> OwnedRepository<'a, R> {
    /// Create a new repository over the shared store.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self {
            storage,
            _resource: PhantomData,
        }
    }

    /// Create a record owned by `principal`.
    ///
    /// Unique keys are reserved before the document is written; on conflict
    /// nothing is written.
    pub fn create(&self, principal: &Principal, data: R) -> RepoResult<Record<R>> {
        data.validate().map_err(RepoError::Validation)?;

        let id = uuid::Uuid::new_v4().to_string();
        let keys = scoped_keys(&principal.username, &data);
        self.reserve_all(&keys, &id)?;

        let now = Utc::now();
        let record = Record {
            id,
            owner: principal.username.clone(),
            created_at: now,
            updated_at: now,
            data,
        };

        if let Err(e) = self.storage.insert(R::COLLECTION, &record.id, &record) {
            self.release_all(&keys, &record.id);
            return Err(e.into());
        }

        tracing::info!(
            resource = R::COLLECTION,
            id = %record.id,
            owner = %record.owner,
            "Record created"
        );
        Ok(record)
    }

    /// Fetch a record, enforcing existence then ownership.
    pub fn get(&self, principal: &Principal, id: &str) -> RepoResult<Record<R>> {
        let id = parse_id(id)?;
        self.find(&id)?.verify_owner(principal, R::LABEL)
    }

    /// List the principal's records, oldest first.
    ///
    /// An owner with no records gets an empty list, never `NotFound`.
    pub fn list(&self, principal: &Principal, limit: Option<usize>) -> RepoResult<Vec<Record<R>>> {
        let mut records: Vec<Record<R>> = self
            .storage
            .list::<Record<R>>(R::COLLECTION)?
            .into_iter()
            .filter(|record| record.owner == principal.username)
            .collect();

        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        if let Some(limit) = limit.or(R::DEFAULT_LIST_LIMIT) {
            records.truncate(limit);
        }

        Ok(records)
    }

    /// Apply a merge-patch to a record.
    ///
    /// Only keys present in `patch` that name a field of `R` are applied.
    /// `id`, `owner` and both timestamps are not fields of `R`, so they can
    /// never be written through this path. `updated_at` is always bumped.
    pub fn update(
        &self,
        principal: &Principal,
        id: &str,
        patch: &Map<String, Value>,
    ) -> RepoResult<Record<R>> {
        let current = self.get(principal, id)?;
        let data = merge_patch(&current.data, patch)?;
        data.validate().map_err(RepoError::Validation)?;

        let old_keys = scoped_keys(&current.owner, &current.data);
        let new_keys = scoped_keys(&current.owner, &data);
        let added: Vec<String> = new_keys.difference(&old_keys).cloned().collect();
        let removed: Vec<String> = old_keys.difference(&new_keys).cloned().collect();

        self.reserve_all(&added, &current.id)?;

        let updated = Record {
            data,
            updated_at: Utc::now(),
            ..current
        };

        match self.storage.replace(R::COLLECTION, &updated.id, &updated) {
            Ok(()) => {}
            Err(e) => {
                self.release_all(&added, &updated.id);
                return Err(match e {
                    // Deleted concurrently after the ownership check.
                    StorageError::NotFound(_) => RepoError::NotFound { resource: R::LABEL },
                    other => other.into(),
                });
            }
        }

        self.release_all(&removed, &updated.id);

        tracing::info!(resource = R::COLLECTION, id = %updated.id, "Record updated");
        Ok(updated)
    }

    /// Delete a record. Deleting a missing id is `NotFound`, not success.
    pub fn delete(&self, principal: &Principal, id: &str) -> RepoResult<()> {
        let record = self.get(principal, id)?;

        match self.storage.remove(R::COLLECTION, &record.id) {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(RepoError::NotFound { resource: R::LABEL });
            }
            Err(e) => return Err(e.into()),
        }

        let keys: Vec<String> = scoped_keys(&record.owner, &record.data).into_iter().collect();
        self.release_all(&keys, &record.id);

        tracing::info!(resource = R::COLLECTION, id = %record.id, "Record deleted");
        Ok(())
    }

    /// Remove every record held by `owner` and free its keys.
    ///
    /// Used when the owning account is deleted. Returns how many records
    /// were removed.
    pub fn purge_owner(&self, owner: &str) -> RepoResult<usize> {
        let owned = self
            .storage
            .list::<Record<R>>(R::COLLECTION)?
            .into_iter()
            .filter(|record| record.owner == owner);

        let mut removed = 0;
        for record in owned {
            match self.storage.remove(R::COLLECTION, &record.id) {
                Ok(()) => removed += 1,
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            let keys: Vec<String> = scoped_keys(&record.owner, &record.data).into_iter().collect();
            self.release_all(&keys, &record.id);
        }

        if removed > 0 {
            tracing::info!(resource = R::COLLECTION, owner, removed, "Purged owner records");
        }
        Ok(removed)
    }

    fn find(&self, id: &str) -> RepoResult<Option<Record<R>>> {
        match self.storage.get(R::COLLECTION, id) {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reserve every key for `holder`, rolling back on the first clash.
    fn reserve_all<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k String>,
        holder: &str,
    ) -> RepoResult<()> {
        let mut reserved: Vec<&String> = Vec::new();
        for key in keys {
            match self.storage.reserve_key(R::COLLECTION, key, holder) {
                Ok(true) => reserved.push(key),
                Ok(false) => {
                    self.release_all(reserved, holder);
                    return Err(RepoError::Conflict { resource: R::LABEL });
                }
                Err(e) => {
                    self.release_all(reserved, holder);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn release_all<'k>(&self, keys: impl IntoIterator<Item = &'k String>, holder: &str) {
        for key in keys {
            if let Err(e) = self.storage.release_key(R::COLLECTION, key, holder) {
                tracing::warn!(resource = R::COLLECTION, holder, error = %e, "Failed to release unique key");
            }
        }
    }
}

/// Uniqueness keys namespaced by owner.
fn scoped_keys<R: Resource>(owner: &str, data: &R) -> HashSet<String> {
    data.unique_keys()
        .into_iter()
        .map(|key| format!("{owner}\u{1f}{key}"))
        .collect()
}

/// Overlay the known keys of `patch` onto `current` and re-validate types.
fn merge_patch<R: Resource>(current: &R, patch: &Map<String, Value>) -> RepoResult<R> {
    let mut merged = serde_json::to_value(current).map_err(StorageError::from)?;
    let Value::Object(fields) = &mut merged else {
        return Err(RepoError::Validation(format!(
            "{} does not serialize to an object",
            R::LABEL
        )));
    };

    for (key, value) in patch {
        if let Some(slot) = fields.get_mut(key) {
            *slot = value.clone();
        }
    }

    serde_json::from_value(merged).map_err(|e| RepoError::Validation(e.to_string()))
}
