// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{AuthGate, PasswordHasher, Principal, TokenService};
use crate::config::ServerConfig;
use crate::resources::{purge_owner, COLLECTIONS};
use crate::storage::{
    DocumentStore, OwnedRepository, PrincipalRepository, RepoResult, Resource, StorageResult,
    StoragePaths,
};

/// Shared application state, cloned into every handler.
///
/// Holds the one process-wide storage handle; repositories are built per
/// call on top of it.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStore>,
    gate: AuthGate,
}

impl AppState {
    /// Build state around an initialized store.
    pub fn new(storage: DocumentStore, tokens: TokenService, hasher: PasswordHasher) -> Self {
        let storage = Arc::new(storage);
        let gate = AuthGate::new(storage.clone(), tokens, hasher);
        Self { storage, gate }
    }

    /// Open the data directory and wire services from configuration.
    pub fn from_config(config: &ServerConfig) -> StorageResult<Self> {
        let mut storage = DocumentStore::new(StoragePaths::new(&config.data_dir));
        storage.initialize(COLLECTIONS)?;

        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.token_ttl_secs),
        );
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        Ok(Self::new(storage, tokens, hasher))
    }

    pub fn storage(&self) -> &DocumentStore {
        &self.storage
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Credential store.
    pub fn principals(&self) -> PrincipalRepository<'_> {
        PrincipalRepository::new(&self.storage)
    }

    /// Delete the requester's own account together with every record it
    /// owns.
    pub fn delete_principal(&self, requester: &Principal, id: &str) -> RepoResult<()> {
        self.principals()
            .delete(requester, id, |owner| purge_owner(&self.storage, owner))
    }

    /// Owner-scoped repository for resource type `R`.
    pub fn repository<R: Resource>(&self) -> OwnedRepository<'_, R> {
        OwnedRepository::new(&self.storage)
    }
}

/// State over a fresh temporary data directory, with cheap bcrypt.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut storage = DocumentStore::new(StoragePaths::new(temp_dir.path()));
    storage
        .initialize(COLLECTIONS)
        .expect("Failed to initialize storage");

    let state = AppState::new(
        storage,
        TokenService::new(b"unit-test-secret-0123456789abcdef", Duration::days(7)),
        PasswordHasher::new(4),
    );
    (state, temp_dir)
}
