// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Portfolio Resources
//!
//! The owned record types. Each one is plain data plus a [`Resource`] impl
//! naming its collection, its uniqueness keys and its field checks; storage,
//! ownership and merge-patch are shared through `OwnedRepository`.
//!
//! | Collection | Unique per owner |
//! |------------|------------------|
//! | `awards` | title |
//! | `basicinfo` | any phone number, website URL |
//! | `certifications` | name |
//! | `educations` | study type |
//! | `experiences` | (name, company) |
//! | `interests` | name |
//! | `projects` | name |
//! | `publications` | title |
//! | `references` | name |
//! | `skills` | name |

pub mod award;
pub mod basic_info;
pub mod certification;
pub mod education;
pub mod experience;
pub mod interest;
pub mod project;
pub mod publication;
pub mod reference;
pub mod skill;

pub use award::Award;
pub use basic_info::{BasicInfo, Profile};
pub use certification::Certification;
pub use education::Education;
pub use experience::Experience;
pub use interest::Interest;
pub use project::Project;
pub use publication::Publication;
pub use reference::Reference;
pub use skill::Skill;

use crate::storage::{DocumentStore, OwnedRepository, RepoResult, Resource, USERS_COLLECTION};

/// Every collection the store must create at startup.
pub const COLLECTIONS: &[&str] = &[
    USERS_COLLECTION,
    Award::COLLECTION,
    BasicInfo::COLLECTION,
    Certification::COLLECTION,
    Education::COLLECTION,
    Experience::COLLECTION,
    Interest::COLLECTION,
    Project::COLLECTION,
    Publication::COLLECTION,
    Reference::COLLECTION,
    Skill::COLLECTION,
];

/// Remove every record `owner` holds, across all resource collections.
///
/// Returns the number of records removed.
pub fn purge_owner(storage: &DocumentStore, owner: &str) -> RepoResult<usize> {
    let purges: [fn(&DocumentStore, &str) -> RepoResult<usize>; 10] = [
        purge::<Award>,
        purge::<BasicInfo>,
        purge::<Certification>,
        purge::<Education>,
        purge::<Experience>,
        purge::<Interest>,
        purge::<Project>,
        purge::<Publication>,
        purge::<Reference>,
        purge::<Skill>,
    ];

    let mut removed = 0;
    for purge_collection in purges {
        removed += purge_collection(storage, owner)?;
    }
    Ok(removed)
}

fn purge<R: Resource>(storage: &DocumentStore, owner: &str) -> RepoResult<usize> {
    OwnedRepository::<R>::new(storage).purge_owner(owner)
}

/// Canonical form of a uniqueness key value.
pub(crate) fn key_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Fail when a required text field is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

/// Fail unless `value` is empty or an absolute http(s) URL.
pub(crate) fn check_url(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(())
        }
        _ => Err(format!("{field}: {value} is not a valid URL")),
    }
}

/// Fail unless `value` looks like `local@domain.tld`.
pub(crate) fn check_email(field: &str, value: &str) -> Result<(), String> {
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
                && !value.chars().any(char::is_whitespace)
        });
    if !valid {
        return Err(format!("{field}: {value} is not a valid e-mail address"));
    }
    Ok(())
}

/// Fail unless `value` is empty or a phone number of 7 to 15 digits, with
/// an optional leading `+` and space or dash separators.
pub(crate) fn check_phone(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    let body = value.strip_prefix('+').unwrap_or(value);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    if !allowed || !(7..=15).contains(&digits) {
        return Err(format!("{field}: {value} is not a valid phone number"));
    }
    Ok(())
}

/// Serde helpers accepting RFC 3339 timestamps as well as bare ISO-8601
/// dates (`2024-05-01`) and naive date-times, all read as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[test]
    fn urls_must_be_absolute_http() {
        assert!(check_url("url", "").is_ok());
        assert!(check_url("url", "https://github.com/alice").is_ok());
        assert!(check_url("url", "http://localhost:3000/demo").is_ok());
        assert!(check_url("url", "github.com/alice").is_err());
        assert!(check_url("url", "ftp://files.example.com").is_err());
        assert!(check_url("url", "not a url").is_err());
    }

    #[test]
    fn emails_need_local_part_and_domain() {
        assert!(check_email("email", "bob@example.com").is_ok());
        assert!(check_email("email", "bob@mail.example.co.uk").is_ok());
        assert!(check_email("email", "bob").is_err());
        assert!(check_email("email", "@example.com").is_err());
        assert!(check_email("email", "bob@localhost").is_err());
        assert!(check_email("email", "bob@@example.com").is_err());
        assert!(check_email("email", "bob smith@example.com").is_err());
    }

    #[test]
    fn phone_numbers_are_digit_runs() {
        assert!(check_phone("phone", "").is_ok());
        assert!(check_phone("phone", "+2348012345678").is_ok());
        assert!(check_phone("phone", "080-1234-5678").is_ok());
        assert!(check_phone("phone", "12345").is_err());
        assert!(check_phone("phone", "call me").is_err());
    }

    #[test]
    fn timestamps_accept_dates_and_datetimes() {
        let date = timestamp::parse("2024-05-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-05-01T00:00:00+00:00");

        let naive = timestamp::parse("2024-05-01T10:30:00").unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        let offset = timestamp::parse("2024-05-01T10:30:00+01:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2024-05-01T09:30:00+00:00");

        assert!(timestamp::parse("May 1st").is_none());
    }

    #[test]
    fn key_values_ignore_case_and_padding() {
        assert_eq!(key_value("  Go "), key_value("go"));
    }

    #[test]
    fn every_collection_is_distinct() {
        let mut names = COLLECTIONS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COLLECTIONS.len());
    }

    #[test]
    fn purge_owner_clears_every_collection() {
        let (state, _dir) = test_state();
        let hash = state.gate().hasher().hash("s3cret!!").unwrap();
        let alice = state.principals().create("alice", "alice@example.com", hash.clone()).unwrap();
        let bob = state.principals().create("bobby", "bob@example.com", hash).unwrap();

        let skill: Skill = serde_json::from_str(r#"{"name": "Go"}"#).unwrap();
        let interest: Interest = serde_json::from_str(r#"{"name": "Chess"}"#).unwrap();
        state.repository::<Skill>().create(&alice, skill.clone()).unwrap();
        state.repository::<Interest>().create(&alice, interest).unwrap();
        state.repository::<Skill>().create(&bob, skill).unwrap();

        assert_eq!(purge_owner(state.storage(), "alice").unwrap(), 2);
        assert!(state.repository::<Skill>().list(&alice, None).unwrap().is_empty());
        assert!(state.repository::<Interest>().list(&alice, None).unwrap().is_empty());
        assert_eq!(state.repository::<Skill>().list(&bob, None).unwrap().len(), 1);
    }
}
