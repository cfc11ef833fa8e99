// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{key_value, require};
use crate::storage::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Interest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Resource for Interest {
    const COLLECTION: &'static str = "interests";
    const LABEL: &'static str = "Interest";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("name:{}", key_value(&self.name))]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)
    }
}
