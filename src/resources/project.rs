// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_url, key_value, require, timestamp};
use crate::storage::Resource;

/// Page size for project listings when the caller gives none.
pub const DEFAULT_PROJECT_LIMIT: usize = 10;

/// A showcased project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub github_repository_url: String,
    #[serde(default)]
    pub project_live_url: String,
    #[serde(default)]
    pub primary_language: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "timestamp::option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Resource for Project {
    const COLLECTION: &'static str = "projects";
    const LABEL: &'static str = "Project";
    const DEFAULT_LIST_LIMIT: Option<usize> = Some(DEFAULT_PROJECT_LIMIT);

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("name:{}", key_value(&self.name))]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        check_url("image_url", &self.image_url)?;
        check_url("video_url", &self.video_url)?;
        check_url("github_repository_url", &self.github_repository_url)?;
        check_url("project_live_url", &self.project_live_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_url_field_is_checked() {
        for field in ["image_url", "video_url", "github_repository_url", "project_live_url"] {
            let mut payload = serde_json::json!({"name": "portfolio"});
            payload[field] = serde_json::Value::from("not-a-url");
            let project: Project = serde_json::from_value(payload).unwrap();
            let error = project.validate().unwrap_err();
            assert!(error.starts_with(field), "{field}: {error}");
        }
    }

    #[test]
    fn listing_is_capped_by_default() {
        assert_eq!(Project::DEFAULT_LIST_LIMIT, Some(10));
    }
}
