// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Username/password login exchanging credentials for a signed bearer token.
//!
//! ## Auth Flow
//!
//! 1. Client posts `username` + `password` (form-encoded) to `/v1/auth/login`
//! 2. Server verifies the password against the stored bcrypt hash and
//!    returns `{access_token, token_type: "bearer"}`
//! 3. Client sends `Authorization: Bearer <token>` on every later call
//! 4. Server:
//!    - Verifies the HS256 signature and expiry
//!    - Extracts `sub` → username
//!    - Re-reads the principal so deleted/disabled accounts are cut off
//!
//! ## Security
//!
//! - Plaintext passwords are never stored or logged
//! - Login failures do not reveal whether the username exists
//! - Tokens are stateless; expiry is the only revocation of a token itself

pub mod error;
pub mod extractor;
pub mod gate;
pub mod password;
pub mod token;

pub use crate::storage::Principal;
pub use error::AuthError;
pub use extractor::Auth;
pub use gate::AuthGate;
pub use password::{PasswordHasher, DEFAULT_BCRYPT_COST, MAX_PASSWORD_BYTES};
pub use token::{TokenClaims, TokenService, DEFAULT_TOKEN_TTL_SECS};
