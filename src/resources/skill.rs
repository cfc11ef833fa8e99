// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{key_value, require};
use crate::storage::Resource;

/// A skill with a free-form proficiency level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Skill {
    pub name: String,
    /// e.g. "Beginner", "Advanced"
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Resource for Skill {
    const COLLECTION: &'static str = "skills";
    const LABEL: &'static str = "Skill";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("name:{}", key_value(&self.name))]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_only_payload_is_enough() {
        let skill: Skill = serde_json::from_str(r#"{"name": "Go"}"#).unwrap();
        assert!(skill.validate().is_ok());
        assert!(skill.level.is_empty());
        assert!(skill.keywords.is_empty());
    }

    #[test]
    fn names_differing_in_case_share_a_key() {
        let a: Skill = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        let b: Skill = serde_json::from_str(r#"{"name": " rust"}"#).unwrap();
        assert_eq!(a.unique_keys(), b.unique_keys());
    }
}
