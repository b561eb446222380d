// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profile and login history models.

use crate::models::lenient;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Member profile stored in `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth uid (also used as document ID)
    #[serde(default, deserialize_with = "lenient::string")]
    pub uid: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient::string")]
    pub bio: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    /// Free text; the portal compares these numerically when both parse.
    #[serde(default, deserialize_with = "lenient::string")]
    pub current_weight: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub goal_weight: String,
    #[serde(rename = "photoURL", default, deserialize_with = "lenient::string")]
    pub photo_url: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub one_rep_maxes: Vec<OneRepMax>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub personal_records: Vec<PersonalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Profile used when the real one cannot be fetched in time.
    pub fn fallback(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            display_name: "User".to_string(),
            role: Role::Member,
            ..Default::default()
        }
    }

    /// Name to snapshot onto entries: display name, then email.
    pub fn label(&self) -> Option<&str> {
        [self.display_name.as_str(), self.email.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    Admin,
    /// Unknown roles read as member.
    #[default]
    #[serde(other)]
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Member => "member",
            Role::Coach => "coach",
            Role::Admin => "admin",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OneRepMax {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub exercise: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub weight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PersonalRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub exercise: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub record: String,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
}

/// Append-only record in the `loginHistory` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    /// RFC 3339 timestamp
    #[serde(default, deserialize_with = "lenient::string")]
    pub timestamp: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_wire_names() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1",
            "displayName": "Sam",
            "role": "coach",
            "photoURL": "https://example.com/p.jpg",
            "currentWeight": 180,
            "oneRepMaxes": [{"id": 1, "exercise": "Back Squat", "weight": "315"}]
        }))
        .unwrap();

        assert_eq!(profile.role, Role::Coach);
        assert_eq!(profile.photo_url, "https://example.com/p.jpg");
        assert_eq!(profile.current_weight, "180");
        assert_eq!(profile.one_rep_maxes[0].id, "1");
    }

    #[test]
    fn test_unknown_role_is_member() {
        let profile: UserProfile =
            serde_json::from_value(json!({"uid": "u1", "role": "owner"})).unwrap();
        assert_eq!(profile.role, Role::Member);
    }

    #[test]
    fn test_role_wire_values() {
        let role: Role = serde_json::from_value(json!("superuser")).unwrap();
        assert_eq!(role, Role::Member);
        assert_eq!(Role::default(), Role::Member);

        assert_eq!(serde_json::to_value(Role::Member).unwrap(), json!("member"));
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
        assert_eq!(
            serde_json::from_value::<Role>(json!("coach")).unwrap(),
            Role::Coach
        );
    }

    #[test]
    fn test_label_prefers_display_name() {
        let mut profile = UserProfile {
            email: "sam@example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.label(), Some("sam@example.com"));

        profile.display_name = "Sam".to_string();
        assert_eq!(profile.label(), Some("Sam"));

        assert_eq!(UserProfile::default().label(), None);
    }

    #[test]
    fn test_fallback_profile() {
        let profile = UserProfile::fallback("u9");
        assert_eq!(profile.uid, "u9");
        assert_eq!(profile.display_name, "User");
        assert_eq!(profile.role, Role::Member);
    }
}
