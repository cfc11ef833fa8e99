// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{check_url, key_value, require};
use crate::storage::Resource;

/// A degree, diploma or course of study.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Education {
    pub institution: String,
    #[serde(default)]
    pub url: String,
    pub course_studied: String,
    /// e.g. "Bachelor", "Master"; one record per study type
    pub study_type: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: String,
    #[serde(default)]
    pub gpa: Option<f64>,
}

impl Resource for Education {
    const COLLECTION: &'static str = "educations";
    const LABEL: &'static str = "Education";

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("study_type:{}", key_value(&self.study_type))]
    }

    fn validate(&self) -> Result<(), String> {
        require("institution", &self.institution)?;
        require("course_studied", &self.course_studied)?;
        require("study_type", &self.study_type)?;
        check_url("url", &self.url)?;
        if self.gpa.is_some_and(|gpa| !gpa.is_finite() || gpa < 0.0) {
            return Err("gpa must be a non-negative number".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn education() -> Education {
        serde_json::from_str(
            r#"{"institution": "University of Lagos", "course_studied": "Computer Science",
                "study_type": "Bachelor", "gpa": 4.5}"#,
        )
        .unwrap()
    }

    #[test]
    fn valid_education_passes() {
        assert!(education().validate().is_ok());
    }

    #[test]
    fn negative_gpa_is_rejected() {
        let mut edu = education();
        edu.gpa = Some(-1.0);
        assert!(edu.validate().is_err());
    }

    #[test]
    fn keyed_by_study_type() {
        assert_eq!(education().unique_keys(), vec!["study_type:bachelor".to_string()]);
    }
}
