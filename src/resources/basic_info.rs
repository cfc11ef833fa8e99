// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Personal header of a portfolio: name, contact details and profiles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_phone, check_url, key_value, require};
use crate::storage::Resource;

fn default_country_code() -> String {
    "NG".to_string()
}

/// A link to the owner on another platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Profile {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: String,
}

/// Basic personal information.
///
/// Conflicts with another record of the same owner sharing any phone number
/// or the website URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BasicInfo {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    #[serde(default)]
    pub label: String,
    pub phone_number: Vec<String>,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    /// ISO 3166 alpha-2 or alpha-3
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Resource for BasicInfo {
    const COLLECTION: &'static str = "basicinfo";
    const LABEL: &'static str = "Basic info";

    fn unique_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .phone_number
            .iter()
            .map(|phone| format!("phone:{}", phone_digits(phone)))
            .collect();
        if !self.website_url.trim().is_empty() {
            keys.push(format!("website:{}", key_value(&self.website_url)));
        }
        keys
    }

    fn validate(&self) -> Result<(), String> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        for phone in &self.phone_number {
            require("phone_number", phone)?;
            check_phone("phone_number", phone)?;
        }
        check_url("website_url", &self.website_url)?;
        for profile in &self.profiles {
            check_url("profiles.url", &profile.url)?;
        }
        let code = self.country_code.as_str();
        if !code.is_empty()
            && !((code.len() == 2 || code.len() == 3) && code.chars().all(|c| c.is_ascii_uppercase()))
        {
            return Err(format!("country_code: {code} is not an ISO 3166 code"));
        }
        Ok(())
    }
}

/// Phone numbers compare on their digits only.
fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
