// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_url, key_value, require, timestamp};
use crate::storage::Resource;

/// An article, paper or book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Publication {
    pub title: String,
    pub author: String,
    #[serde(with = "timestamp")]
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, with = "timestamp::option")]
    pub full_release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publication_url: String,
}

impl Resource for Publication {
    const COLLECTION: &'static str = "publications";
    const LABEL: &'static str = "Publication";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("title:{}", key_value(&self.title))]
    }

    fn validate(&self) -> Result<(), String> {
        require("title", &self.title)?;
        require("author", &self.author)?;
        check_url("publication_url", &self.publication_url)
    }
}
