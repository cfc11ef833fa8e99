// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_email, check_phone, key_value, require};
use crate::storage::Resource;

/// A professional reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Reference {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub years_known: u32,
    #[serde(default)]
    pub is_verified: bool,
}

impl Resource for Reference {
    const COLLECTION: &'static str = "references";
    const LABEL: &'static str = "Reference";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("name:{}", key_value(&self.name))]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        check_email("email", &self.email)?;
        check_phone("phone_number", &self.phone_number)
    }
}
