// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profiles, login tracking and the admin overview.

use crate::db::{collections, from_document, list_as, to_fields, Direction, DocumentStore, Fields, Query};
use crate::error::{AppError, Result};
use crate::models::{LoginRecord, OneRepMax, PersonalRecord, Role, UserProfile};
use crate::services::deadline;
use crate::services::messageboard::validate_not_blank;
use crate::time_utils::{format_utc_rfc3339, now_rfc3339, parse_timestamp, today};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Default window for per-member login counts.
pub const LOGIN_WINDOW_DAYS: i64 = 30;
const ACTIVE_WINDOW_DAYS: i64 = 7;
const LOGIN_KIND: &str = "login";

/// Fields a member may change on their own profile. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(custom(function = "validate_not_blank", message = "Display name cannot be empty"))]
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub current_weight: Option<String>,
    pub goal_weight: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub one_rep_maxes: Option<Vec<OneRepMax>>,
    pub personal_records: Option<Vec<PersonalRecord>>,
}

impl ProfileUpdate {
    fn into_fields(self) -> Result<Fields> {
        let mut fields = Fields::new();
        let text = [
            ("displayName", self.display_name.map(|n| n.trim().to_string())),
            ("bio", self.bio),
            ("phone", self.phone),
            ("currentWeight", self.current_weight),
            ("goalWeight", self.goal_weight),
            ("photoURL", self.photo_url),
        ];
        for (name, value) in text {
            if let Some(value) = value {
                fields.insert(name.to_string(), Value::String(value));
            }
        }

        if let Some(mut maxes) = self.one_rep_maxes {
            for max in &mut maxes {
                if max.id.is_empty() {
                    max.id = uuid::Uuid::new_v4().to_string();
                }
            }
            fields.insert("oneRepMaxes".to_string(), to_value(&maxes)?);
        }
        if let Some(mut records) = self.personal_records {
            let day = today();
            for record in &mut records {
                if record.id.is_empty() {
                    record.id = uuid::Uuid::new_v4().to_string();
                }
                if record.date.trim().is_empty() {
                    record.date = day.clone();
                }
            }
            fields.insert("personalRecords".to_string(), to_value(&records)?);
        }

        fields.insert("updatedAt".to_string(), Value::String(now_rfc3339()));
        Ok(fields)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

// ─── Admin overview ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MemberActivity {
    pub profile: UserProfile,
    /// Logins inside the overview window
    pub login_count: usize,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_members: usize,
    pub todays_logins: usize,
    pub active_this_week: usize,
    pub total_logins: usize,
    pub window_days: i64,
    pub members: Vec<MemberActivity>,
    /// Most recent logins first
    pub recent_logins: Vec<LoginRecord>,
}

const RECENT_LOGINS: usize = 50;

impl AdminOverview {
    /// `history` must be ordered newest first. Records with an unreadable
    /// timestamp count toward the total only.
    pub fn build(
        members: Vec<UserProfile>,
        history: Vec<LoginRecord>,
        now: DateTime<Utc>,
        window_days: i64,
    ) -> Self {
        let stamped: Vec<(&LoginRecord, DateTime<Utc>)> = history
            .iter()
            .filter_map(|r| parse_timestamp(&r.timestamp).map(|t| (r, t)))
            .collect();

        let today = now.date_naive();
        let todays_logins = stamped.iter().filter(|(_, t)| t.date_naive() == today).count();

        let week_ago = now - ChronoDuration::days(ACTIVE_WINDOW_DAYS);
        let active_this_week = stamped
            .iter()
            .filter(|(_, t)| *t > week_ago)
            .map(|(r, _)| r.user_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let cutoff = now - ChronoDuration::days(window_days);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut last: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for (record, at) in &stamped {
            if *at > cutoff {
                *counts.entry(record.user_id.as_str()).or_default() += 1;
            }
            let seen = last.entry(record.user_id.as_str()).or_insert(*at);
            if *at > *seen {
                *seen = *at;
            }
        }

        let members: Vec<MemberActivity> = members
            .into_iter()
            .map(|profile| {
                let uid = profile.uid.as_str();
                MemberActivity {
                    login_count: counts.get(uid).copied().unwrap_or(0),
                    last_login: last.get(uid).map(|t| format_utc_rfc3339(*t)),
                    profile,
                }
            })
            .collect();

        Self {
            total_members: members.len(),
            todays_logins,
            active_this_week,
            total_logins: history.len(),
            window_days,
            recent_logins: history.iter().take(RECENT_LOGINS).cloned().collect(),
            members,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    pub profile: UserProfile,
    /// Logins in the last 30 days
    pub login_count: usize,
    /// Logins in the last 7 days
    pub weekly_login_count: usize,
    pub logins: Vec<LoginRecord>,
}

// ─── Service ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    fetch_timeout: Duration,
}

async fn read_profile(store: Arc<dyn DocumentStore>, uid: String) -> Result<Option<UserProfile>> {
    let Some(doc) = store.get(collections::USERS, &uid).await? else {
        return Ok(None);
    };
    Ok(Some(profile_from(doc)?))
}

/// Profiles written before `uid` was stored carry it only as the document id.
fn profile_from(doc: crate::db::Document) -> Result<UserProfile> {
    let id = doc.id.clone();
    let mut profile: UserProfile = from_document(doc)?;
    if profile.uid.is_empty() {
        profile.uid = id;
    }
    Ok(profile)
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, fetch_timeout: Duration) -> Self {
        Self {
            store,
            fetch_timeout,
        }
    }

    /// Fetch a profile, giving up after the fetch timeout.
    pub async fn fetch(&self, uid: &str) -> Result<Option<UserProfile>> {
        deadline::within(
            self.fetch_timeout,
            "profile fetch",
            read_profile(self.store.clone(), uid.to_string()),
        )
        .await
    }

    /// Profile used for role checks. Falls back to a plain member profile
    /// when the real one is missing or cannot be read in time.
    pub async fn resolve(&self, uid: &str) -> UserProfile {
        match self.fetch(uid).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::fallback(uid),
            Err(e) => {
                tracing::warn!(uid, error = %e, "Using fallback profile");
                UserProfile::fallback(uid)
            }
        }
    }

    /// Create the caller's profile on sign-up. New profiles are always
    /// members; an existing profile is returned unchanged.
    pub async fn create(&self, uid: &str, email: &str, display_name: &str) -> Result<UserProfile> {
        if let Some(existing) = self.fetch(uid).await? {
            return Ok(existing);
        }

        let profile = UserProfile {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: display_name.trim().to_string(),
            role: Role::Member,
            created_at: Some(now_rfc3339()),
            ..Default::default()
        };
        let mut fields = Fields::new();
        for (name, value) in [
            ("uid", &profile.uid),
            ("email", &profile.email),
            ("displayName", &profile.display_name),
        ] {
            fields.insert(name.to_string(), Value::String(value.clone()));
        }
        fields.insert("role".to_string(), to_value(&profile.role)?);
        fields.insert("createdAt".to_string(), to_value(&profile.created_at)?);

        self.store.set(collections::USERS, uid, fields).await?;
        tracing::info!(uid, "Profile created");
        Ok(profile)
    }

    pub async fn update(&self, uid: &str, update: ProfileUpdate) -> Result<UserProfile> {
        update.validate()?;
        self.store
            .update_fields(collections::USERS, uid, update.into_fields()?)
            .await
            .map_err(|e| {
                tracing::error!(uid, error = %e, "Failed to update profile");
                AppError::from(e)
            })?;
        tracing::info!(uid, "Profile updated");
        self.fetch(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", uid)))
    }

    pub async fn list_members(&self) -> Result<Vec<UserProfile>> {
        let docs = self.store.list(collections::USERS, Query::all()).await?;
        let mut members = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id.clone();
            match profile_from(doc) {
                Ok(profile) => members.push(profile),
                Err(e) => tracing::warn!(uid = %id, error = %e, "Skipping malformed profile"),
            }
        }
        members.sort_by_cached_key(|p| p.label().unwrap_or_default().to_lowercase());
        Ok(members)
    }

    pub async fn set_role(&self, uid: &str, role: Role) -> Result<UserProfile> {
        let mut fields = Fields::new();
        fields.insert("role".to_string(), to_value(&role)?);
        fields.insert("updatedAt".to_string(), Value::String(now_rfc3339()));
        self.store
            .update_fields(collections::USERS, uid, fields)
            .await?;
        tracing::info!(uid, role = %role, "Role changed");
        self.fetch(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", uid)))
    }

    /// Record a login. Failures are logged and otherwise ignored.
    pub async fn track_login(&self, uid: &str) {
        let record = LoginRecord {
            user_id: uid.to_string(),
            timestamp: now_rfc3339(),
            kind: LOGIN_KIND.to_string(),
            ..Default::default()
        };
        let fields = match to_fields(&record) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(uid, error = %e, "Failed to track login");
                return;
            }
        };

        let store = self.store.clone();
        let result = deadline::within(self.fetch_timeout, "login tracking", async move {
            Ok(store.add(collections::LOGIN_HISTORY, fields).await?)
        })
        .await;
        match result {
            Ok(id) => tracing::debug!(uid, record_id = %id, "Login tracked"),
            Err(e) => tracing::warn!(uid, error = %e, "Failed to track login"),
        }
    }

    /// Login history, newest first. The member filter runs after the
    /// ordered read so the query needs no composite index.
    pub async fn login_history(&self, uid: Option<&str>) -> Result<Vec<LoginRecord>> {
        let query = Query::all().order_by("timestamp", Direction::Descending);
        let mut history: Vec<LoginRecord> =
            list_as(self.store.as_ref(), collections::LOGIN_HISTORY, query).await?;
        if let Some(uid) = uid {
            history.retain(|r| r.user_id == uid);
        }
        Ok(history)
    }

    pub async fn overview(&self, window_days: i64) -> Result<AdminOverview> {
        let members = self.list_members().await?;
        let history = self.login_history(None).await?;
        Ok(AdminOverview::build(members, history, Utc::now(), window_days))
    }

    pub async fn member_detail(&self, uid: &str) -> Result<MemberDetail> {
        let profile = self
            .fetch(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {}", uid)))?;
        let logins = self.login_history(Some(uid)).await?;
        let now = Utc::now();
        let since = |days: i64| {
            let cutoff = now - ChronoDuration::days(days);
            logins
                .iter()
                .filter_map(|r| parse_timestamp(&r.timestamp))
                .filter(|t| *t > cutoff)
                .count()
        };
        Ok(MemberDetail {
            login_count: since(LOGIN_WINDOW_DAYS),
            weekly_login_count: since(ACTIVE_WINDOW_DAYS),
            profile,
            logins,
        })
    }
}
