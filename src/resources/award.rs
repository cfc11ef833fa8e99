// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{key_value, require, timestamp};
use crate::storage::Resource;

/// An award or honour received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Award {
    pub title: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    /// Organisation that granted the award
    pub awarder: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, with = "timestamp::option")]
    pub full_date: Option<DateTime<Utc>>,
}

impl Resource for Award {
    const COLLECTION: &'static str = "awards";
    const LABEL: &'static str = "Award";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("title:{}", key_value(&self.title))]
    }

    fn validate(&self) -> Result<(), String> {
        require("title", &self.title)?;
        require("awarder", &self.awarder)
    }
}
