// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_url, key_value, require, timestamp};
use crate::storage::Resource;

/// A role held at a company.
///
/// Unique per owner on the `(name, company)` pair, so the same title at two
/// employers is two records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Experience {
    /// Role title
    pub name: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub url: String,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    /// `None` while the role is ongoing
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub is_current_role: bool,
    #[serde(default)]
    pub website: String,
}

impl Resource for Experience {
    const COLLECTION: &'static str = "experiences";
    const LABEL: &'static str = "Experience";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!(
            "name:{}\u{1f}company:{}",
            key_value(&self.name),
            key_value(&self.company)
        )]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require("company", &self.company)?;
        check_url("url", &self.url)?;
        check_url("website", &self.website)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err("end_date must not precede start_date".to_string());
            }
        }
        Ok(())
    }
}
