// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portfolio Server - owner-scoped portfolio data API
//!
//! Users register, log in for a bearer token, and manage their own
//! portfolio records (skills, projects, education, ...). Every record is
//! owned by exactly one user; nobody else can read or change it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, bearer tokens and the identity gate
//! - `config` - Environment configuration
//! - `resources` - Portfolio record types and their field rules
//! - `storage` - JSON document store with unique-key markers

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod resources;
pub mod state;
pub mod storage;
