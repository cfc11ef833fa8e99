// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing via bcrypt.
//!
//! bcrypt is deliberately slow, so the async wrappers move the work onto
//! tokio's blocking pool instead of stalling a runtime worker.

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salt and digest of a well-formed bcrypt hash that matches no account.
/// Verifying against it costs the same as a real check at the same cost.
const DUMMY_SALT_AND_DIGEST: &str = "N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Salted one-way password hasher.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// A valid hash at this hasher's cost, for spending verify time when
    /// there is no stored hash to check.
    pub fn dummy_hash(&self) -> String {
        format!("$2b${:02}${DUMMY_SALT_AND_DIGEST}", self.cost)
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = *self;
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}
