// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_url, key_value, require, timestamp};
use crate::storage::Resource;

/// A professional certification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Certification {
    pub name: String,
    /// Public verification link
    pub certified_url: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, with = "timestamp::option")]
    pub date_achieved: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credential_id: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Resource for Certification {
    const COLLECTION: &'static str = "certifications";
    const LABEL: &'static str = "Certification";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("name:{}", key_value(&self.name))]
    }

    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        check_url("certified_url", &self.certified_url)?;
        if let (Some(achieved), Some(expires)) = (self.date_achieved, self.expiration_date) {
            if expires < achieved {
                return Err("expiration_date must not precede date_achieved".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certification(json: &str) -> Certification {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_certification_is_valid() {
        let cert = certification(
            r#"{"name": "CKA", "certified_url": "https://verify.example.org/cka/123"}"#,
        );
        assert!(cert.validate().is_ok());
        assert!(cert.credential_id.is_none());
    }

    #[test]
    fn expiry_before_achievement_is_rejected() {
        let cert = certification(
            r#"{"name": "CKA", "certified_url": "",
                "date_achieved": "2024-01-01", "expiration_date": "2023-01-01"}"#,
        );
        assert!(cert.validate().is_err());
    }
}
