// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard engine and persistence.
//!
//! Boards are ranked by ascending elapsed time. Every add re-sorts the whole
//! board with a stable sort, so entries with equal times keep the order in
//! which they were added.
//!
//! Both write paths (the quick panel and a full editing session) read the
//! event, change the board in memory and overwrite the whole board field.
//! Under [`CommitPolicy::LastWriterWins`] two overlapping writers can lose
//! each other's edits. [`CommitPolicy::VersionChecked`] rejects the second
//! writer with `Conflict` instead.

use crate::db::{collections, get_as, DocumentStore, FieldGuard, Fields, StoreError};
use crate::error::{AppError, Result};
use crate::models::{lenient, BoardKind, Entry, Event, Leaderboard, UserProfile};
use crate::services::deadline;
use crate::time_utils::now_rfc3339;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Name stored on an entry when the member has no display name or email.
const UNKNOWN_USER_NAME: &str = "Unknown";

// ─── Time Parsing / Formatting ───────────────────────────────

/// Numeric value of a stored time: the longest leading decimal number, after
/// leading whitespace. `"195"`, `"195.5s"` and `" 90"` all parse; `"DNF"`
/// does not.
pub fn parse_time(time: &str) -> Option<f64> {
    let s = time.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().ok();
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

/// Render seconds as `M:SS`. Values that are not numbers are returned as is.
pub fn format_time(time: &str) -> String {
    match parse_time(time) {
        Some(t) if t.is_finite() => {
            let minutes = (t / 60.0).floor();
            let seconds = (t % 60.0).floor();
            format!("{}:{:02}", minutes as i64, seconds as i64)
        }
        _ => time.to_string(),
    }
}

/// Display form of an entry's result, e.g. `3:15 • 135`.
pub fn format_result(entry: &Entry) -> String {
    let time = format_time(&entry.time);
    if entry.weight.trim().is_empty() {
        time
    } else {
        format!("{} • {}", time, entry.weight)
    }
}

/// Order two stored times. Non-numeric times sort after numeric ones.
fn compare_times(a: &str, b: &str) -> Ordering {
    match (parse_time(a), parse_time(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ─── Entries ─────────────────────────────────────────────────

/// Result submitted for one athlete.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Select a member"))]
    pub user_id: String,
    /// Numbers or numeric strings, as form inputs send them.
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string | null"))]
    #[validate(range(min = 0, message = "Minutes cannot be negative"))]
    pub minutes: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string | null"))]
    #[validate(range(min = 0, max = 59, message = "Seconds must be between 0 and 59"))]
    pub seconds: Option<i64>,
    #[serde(default)]
    pub weight: Option<String>,
}

impl EntryInput {
    /// Validate the input and return the elapsed time in seconds.
    pub fn total_seconds(&self) -> Result<u64> {
        self.validate()?;
        if self.minutes.is_none() && self.seconds.is_none() {
            return Err(AppError::Validation(
                "time: Enter minutes or seconds".to_string(),
            ));
        }
        // Both are non-negative once validated.
        let minutes = self.minutes.unwrap_or(0).unsigned_abs();
        let seconds = self.seconds.unwrap_or(0).unsigned_abs();
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(|| AppError::Validation("time: Too long".to_string()))
    }

    /// Build the stored entry, snapshotting `user_name`.
    pub fn into_entry(self, user_name: String) -> Result<Entry> {
        let time = self.total_seconds()?;
        Ok(Entry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            user_name,
            time: time.to_string(),
            weight: self.weight.map(|w| w.trim().to_string()).unwrap_or_default(),
        })
    }
}

/// An entry with its position and display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// 1-based position on the board
    pub rank: usize,
    #[serde(flatten)]
    pub entry: Entry,
    pub display: String,
}

impl Leaderboard {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `entry` and re-sort the whole board.
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.normalize();
    }

    /// Sort ascending by time. Ties keep their order (`sort_by` is stable).
    pub fn normalize(&mut self) {
        self.entries.sort_by(|a, b| compare_times(&a.time, &b.time));
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove_entry(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn ranked(&self) -> Vec<RankedEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| RankedEntry {
                rank: i + 1,
                display: format_result(entry),
                entry: entry.clone(),
            })
            .collect()
    }
}

// ─── Editing Session ─────────────────────────────────────────

/// Why the last save failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct SaveFailure {
    /// Error code, as in API error bodies
    pub code: String,
    pub message: String,
}

impl From<&AppError> for SaveFailure {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(tag = "state", content = "failure", rename_all = "lowercase")]
pub enum SessionState {
    /// Local boards match what was read.
    Viewing,
    /// Local boards differ from the store.
    Editing,
    /// A write is in flight.
    Saving,
    /// Local boards were written and are the new baseline.
    Saved,
    /// The write failed. Local edits are kept so the save can be retried.
    Error(SaveFailure),
}

/// Both boards of one event, as written by a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardWrite {
    pub event_id: String,
    pub main: Leaderboard,
    pub locker: Leaderboard,
    /// Event version the edits were based on. Only checked under
    /// [`CommitPolicy::VersionChecked`].
    pub base_version: u64,
}

impl LeaderboardWrite {
    /// Sort both boards, whatever order they arrived in.
    pub fn normalize(&mut self) {
        self.main.normalize();
        self.locker.normalize();
    }
}

/// One editor's view of an event's leaderboards.
#[derive(Debug, Clone)]
pub struct LeaderboardSession {
    event_id: String,
    base_version: u64,
    main: Leaderboard,
    locker: Leaderboard,
    state: SessionState,
}

impl LeaderboardSession {
    pub fn open(event: &Event) -> Self {
        Self {
            event_id: event.id.clone(),
            base_version: event.version,
            main: event.main_leaderboard.clone(),
            locker: event.locker_wod_leaderboard.clone(),
            state: SessionState::Viewing,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn board(&self, kind: BoardKind) -> &Leaderboard {
        match kind {
            BoardKind::Main => &self.main,
            BoardKind::Locker => &self.locker,
        }
    }

    fn board_mut(&mut self, kind: BoardKind) -> Result<&mut Leaderboard> {
        if self.state == SessionState::Saving {
            return Err(AppError::Conflict("A save is already in progress".to_string()));
        }
        self.state = SessionState::Editing;
        Ok(match kind {
            BoardKind::Main => &mut self.main,
            BoardKind::Locker => &mut self.locker,
        })
    }

    pub fn add_entry(&mut self, kind: BoardKind, entry: Entry) -> Result<()> {
        self.board_mut(kind)?.add_entry(entry);
        Ok(())
    }

    pub fn remove_entry(&mut self, kind: BoardKind, entry_id: &str) -> Result<bool> {
        Ok(self.board_mut(kind)?.remove_entry(entry_id))
    }

    /// Enter `Saving` and return what should be written.
    pub fn begin_save(&mut self) -> Result<LeaderboardWrite> {
        if self.state == SessionState::Saving {
            return Err(AppError::Conflict("A save is already in progress".to_string()));
        }
        self.state = SessionState::Saving;
        Ok(LeaderboardWrite {
            event_id: self.event_id.clone(),
            main: self.main.clone(),
            locker: self.locker.clone(),
            base_version: self.base_version,
        })
    }

    /// Record the outcome of the write started by [`begin_save`](Self::begin_save).
    pub fn complete_save(&mut self, outcome: &Result<u64>) {
        self.state = match outcome {
            Ok(version) => {
                self.base_version = *version;
                SessionState::Saved
            }
            Err(err) => SessionState::Error(SaveFailure::from(err)),
        };
    }

    /// Drop local edits and start over from a fresh read.
    pub fn discard(&mut self, fresh: &Event) {
        *self = Self::open(fresh);
    }
}

// ─── Persistence ─────────────────────────────────────────────

/// How leaderboard writes treat concurrent editors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Overwrite without checking; a concurrent edit can be lost.
    #[default]
    LastWriterWins,
    /// Require the event version read by the editor; `Conflict` otherwise.
    VersionChecked,
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-writer-wins" => Ok(CommitPolicy::LastWriterWins),
            "version-checked" => Ok(CommitPolicy::VersionChecked),
            other => Err(format!("unknown commit policy '{}'", other)),
        }
    }
}

/// Reads and writes event leaderboards.
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn DocumentStore>,
    policy: CommitPolicy,
    save_timeout: Duration,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: CommitPolicy, save_timeout: Duration) -> Self {
        Self {
            store,
            policy,
            save_timeout,
        }
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Event> {
        get_as::<Event>(self.store.as_ref(), collections::EVENTS, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", event_id)))
    }

    /// Open an editing session from a fresh read of the event.
    pub async fn load(&self, event_id: &str) -> Result<LeaderboardSession> {
        Ok(LeaderboardSession::open(&self.fetch_event(event_id).await?))
    }

    /// Snapshot name for a new entry: display name, then email, then "Unknown".
    pub async fn resolve_user_name(&self, user_id: &str) -> String {
        match get_as::<UserProfile>(self.store.as_ref(), collections::USERS, user_id).await {
            Ok(Some(profile)) => profile
                .label()
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
            Ok(None) => UNKNOWN_USER_NAME.to_string(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to look up entry name");
                UNKNOWN_USER_NAME.to_string()
            }
        }
    }

    /// Validate `input` and turn it into a new entry.
    pub async fn new_entry(&self, input: EntryInput) -> Result<Entry> {
        // Reject bad input before any store call.
        input.total_seconds()?;
        let name = self.resolve_user_name(&input.user_id).await;
        input.into_entry(name)
    }

    /// Add one entry to one board (quick panel path).
    pub async fn quick_add(
        &self,
        event_id: &str,
        kind: BoardKind,
        input: EntryInput,
    ) -> Result<Leaderboard> {
        let entry = self.new_entry(input).await?;
        let event = self.fetch_event(event_id).await?;

        let mut board = event.board(kind).clone();
        let entry_id = entry.id.clone();
        board.add_entry(entry);

        self.write_board(event_id, kind, &board, event.version).await?;
        tracing::info!(
            event_id,
            board = %kind,
            entry_id = %entry_id,
            entries = board.len(),
            "Leaderboard entry added"
        );
        Ok(board)
    }

    /// Remove one entry from one board (quick panel path). Removing a missing
    /// entry still rewrites the board unchanged.
    pub async fn quick_remove(
        &self,
        event_id: &str,
        kind: BoardKind,
        entry_id: &str,
    ) -> Result<Leaderboard> {
        let event = self.fetch_event(event_id).await?;

        let mut board = event.board(kind).clone();
        let removed = board.remove_entry(entry_id);

        self.write_board(event_id, kind, &board, event.version).await?;
        tracing::info!(
            event_id,
            board = %kind,
            entry_id,
            removed,
            "Leaderboard entry removed"
        );
        Ok(board)
    }

    /// Write both boards of `session` wholesale.
    ///
    /// On failure the session moves to `Error` and keeps its edits; the
    /// stored event is unchanged unless a timed-out write lands later.
    pub async fn commit(&self, session: &mut LeaderboardSession) -> Result<()> {
        let write = session.begin_save()?;
        let outcome = self.save(write).await;
        session.complete_save(&outcome);
        outcome.map(|_| ())
    }

    /// Write both boards and return the new event version.
    ///
    /// Boards are sorted before writing. Under last-writer-wins the stored
    /// version is bumped and `base_version` is ignored.
    pub async fn save(&self, mut write: LeaderboardWrite) -> Result<u64> {
        // The event must still exist; a blind update would fail less clearly.
        let event = self.fetch_event(&write.event_id).await?;
        write.normalize();

        let base_version = match self.policy {
            CommitPolicy::LastWriterWins => event.version,
            CommitPolicy::VersionChecked => write.base_version,
        };

        let mut fields = Fields::new();
        fields.insert(BoardKind::Main.field().to_string(), boards_value(&write.main)?);
        fields.insert(
            BoardKind::Locker.field().to_string(),
            boards_value(&write.locker)?,
        );

        let version = self.write(&write.event_id, fields, base_version).await?;
        tracing::info!(
            event_id = %write.event_id,
            main = write.main.len(),
            locker = write.locker.len(),
            version,
            "Leaderboards saved"
        );
        Ok(version)
    }

    async fn write_board(
        &self,
        event_id: &str,
        kind: BoardKind,
        board: &Leaderboard,
        base_version: u64,
    ) -> Result<u64> {
        let mut fields = Fields::new();
        fields.insert(kind.field().to_string(), boards_value(board)?);
        self.write(event_id, fields, base_version).await
    }

    /// Overwrite `fields` plus `updatedAt` and `version` within the save budget.
    async fn write(&self, event_id: &str, mut fields: Fields, base_version: u64) -> Result<u64> {
        let next_version = base_version + 1;
        fields.insert("updatedAt".to_string(), Value::String(now_rfc3339()));
        fields.insert("version".to_string(), Value::from(next_version));

        let store = self.store.clone();
        let policy = self.policy;
        let id = event_id.to_string();

        let result = deadline::within(self.save_timeout, "Leaderboard save", async move {
            match policy {
                CommitPolicy::LastWriterWins => {
                    store.update_fields(collections::EVENTS, &id, fields).await?
                }
                CommitPolicy::VersionChecked => {
                    // Events written before versioning have no field.
                    let guard = FieldGuard::new("version", base_version)
                        .allow_missing(base_version == 0);
                    store
                        .update_fields_checked(collections::EVENTS, &id, guard, fields)
                        .await?
                }
            }
            Ok(next_version)
        })
        .await;

        if let Err(e) = &result {
            tracing::error!(event_id, error = %e, policy = ?self.policy, "Leaderboard write failed");
        }
        result
    }
}

fn boards_value(board: &Leaderboard) -> Result<Value> {
    serde_json::to_value(board).map_err(|e| AppError::from(StoreError::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{to_fields, MemoryStore};

    fn entry(id: &str, time: &str) -> Entry {
        Entry {
            id: id.to_string(),
            user_id: format!("user-{}", id),
            user_name: id.to_string(),
            time: time.to_string(),
            weight: String::new(),
        }
    }

    fn ids(board: &Leaderboard) -> Vec<&str> {
        board.entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn input(user: &str, minutes: Option<i64>, seconds: Option<i64>) -> EntryInput {
        EntryInput {
            user_id: user.to_string(),
            minutes,
            seconds,
            weight: None,
        }
    }

    #[test]
    fn test_parse_time_prefix_semantics() {
        assert_eq!(parse_time("195"), Some(195.0));
        assert_eq!(parse_time("  90"), Some(90.0));
        assert_eq!(parse_time("195.5s"), Some(195.5));
        assert_eq!(parse_time(".5"), Some(0.5));
        assert_eq!(parse_time("1e2"), Some(100.0));
        assert_eq!(parse_time("1e"), Some(1.0));
        assert_eq!(parse_time("-3"), Some(-3.0));
        assert_eq!(parse_time("DNF"), None);
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("."), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("90"), "1:30");
        assert_eq!(format_time("9"), "0:09");
        assert_eq!(format_time("195"), "3:15");
        assert_eq!(format_time("0"), "0:00");
        assert_eq!(format_time("DNF"), "DNF");
        assert_eq!(format_time(""), "");
    }

    #[test]
    fn test_total_seconds_round_trips_through_format() {
        for minutes in [0i64, 1, 3, 12, 59, 120] {
            for seconds in [0i64, 9, 30, 59] {
                let total = input("u1", Some(minutes), Some(seconds))
                    .total_seconds()
                    .unwrap();
                assert_eq!(total, (minutes * 60 + seconds) as u64);
                assert_eq!(
                    format_time(&total.to_string()),
                    format!("{}:{:02}", minutes, seconds)
                );
            }
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(matches!(
            input("", Some(3), None).total_seconds(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            input("u1", None, None).total_seconds(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            input("u1", Some(1), Some(60)).total_seconds(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            input("u1", Some(-2), Some(10)).total_seconds(),
            Err(AppError::Validation(_))
        ));
        assert_eq!(input("u1", None, Some(45)).total_seconds().unwrap(), 45);
    }

    #[test]
    fn test_entry_input_reads_form_strings() {
        let submitted: EntryInput = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "minutes": "3",
            "seconds": ""
        }))
        .unwrap();
        assert_eq!(submitted.minutes, Some(3));
        assert_eq!(submitted.seconds, None);
        assert_eq!(submitted.total_seconds().unwrap(), 180);
    }

    #[test]
    fn test_into_entry_shape() {
        let mut submitted = input("u1", Some(3), Some(15));
        submitted.weight = Some(" 135 ".to_string());
        let entry = submitted.into_entry("Sam".to_string()).unwrap();

        assert_eq!(entry.time, "195");
        assert_eq!(entry.weight, "135");
        assert_eq!(entry.user_name, "Sam");
        assert!(uuid::Uuid::parse_str(&entry.id).is_ok());
        assert_eq!(format_result(&entry), "3:15 • 135");
    }

    #[test]
    fn test_add_keeps_board_sorted() {
        let mut board = Leaderboard::default();
        let times = [300u64, 12, 195, 195, 7, 4000, 60, 61, 12];
        for (i, t) in times.iter().enumerate() {
            board.add_entry(entry(&i.to_string(), &t.to_string()));
            let parsed: Vec<f64> = board
                .entries
                .iter()
                .map(|e| parse_time(&e.time).unwrap())
                .collect();
            assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
        }
        assert_eq!(board.len(), times.len());
    }

    #[test]
    fn test_equal_times_keep_insertion_order() {
        let mut board = Leaderboard::default();
        board.add_entry(entry("a", "120"));
        board.add_entry(entry("b", "120"));
        board.add_entry(entry("c", "90"));
        board.add_entry(entry("d", "120"));

        assert_eq!(ids(&board), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_non_numeric_times_sort_last() {
        let mut board = Leaderboard::default();
        board.add_entry(entry("dnf", "DNF"));
        board.add_entry(entry("fast", "100"));
        board.add_entry(entry("slow", "200"));

        assert_eq!(ids(&board), vec!["fast", "slow", "dnf"]);
    }

    #[test]
    fn test_remove_entry() {
        let mut board = Leaderboard::new(vec![entry("a", "1"), entry("b", "2"), entry("c", "3")]);

        let before = board.clone();
        assert!(!board.remove_entry("zzz"));
        assert_eq!(board, before);

        assert!(board.remove_entry("b"));
        assert_eq!(ids(&board), vec!["a", "c"]);
    }

    #[test]
    fn test_ranked_display() {
        let mut first = entry("a", "170");
        first.weight = "95".to_string();
        let board = Leaderboard::new(vec![first, entry("b", "195")]);

        let ranked = board.ranked();
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].display, "2:50 • 95");
        assert_eq!(ranked[1].display, "3:15");
    }

    #[test]
    fn test_session_state_machine() {
        let event = Event {
            id: "e1".to_string(),
            version: 4,
            ..Default::default()
        };
        let mut session = LeaderboardSession::open(&event);
        assert_eq!(session.state(), &SessionState::Viewing);

        session.add_entry(BoardKind::Main, entry("a", "100")).unwrap();
        assert_eq!(session.state(), &SessionState::Editing);

        let write = session.begin_save().unwrap();
        assert_eq!(write.base_version, 4);
        assert_eq!(session.state(), &SessionState::Saving);
        assert!(session.add_entry(BoardKind::Main, entry("b", "1")).is_err());
        assert!(session.begin_save().is_err());

        session.complete_save(&Err(AppError::Timeout("slow".to_string())));
        match session.state() {
            SessionState::Error(failure) => assert_eq!(failure.code, "timeout"),
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(session.board(BoardKind::Main).len(), 1);

        session.begin_save().unwrap();
        session.complete_save(&Ok(5));
        assert_eq!(session.state(), &SessionState::Saved);
        assert_eq!(session.base_version(), 5);

        session.discard(&event);
        assert_eq!(session.state(), &SessionState::Viewing);
        assert!(session.board(BoardKind::Main).is_empty());
    }

    #[test]
    fn test_commit_policy_from_str() {
        assert_eq!(
            "last-writer-wins".parse::<CommitPolicy>().unwrap(),
            CommitPolicy::LastWriterWins
        );
        assert_eq!(
            "Version-Checked".parse::<CommitPolicy>().unwrap(),
            CommitPolicy::VersionChecked
        );
        assert!("optimistic".parse::<CommitPolicy>().is_err());
    }

    async fn store_with_event(existing: Vec<Entry>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let event = Event {
            title: "Fran Friday".to_string(),
            start: "2024-05-03".to_string(),
            main_leaderboard: Leaderboard::new(existing),
            ..Default::default()
        };
        store
            .set(collections::EVENTS, "e1", to_fields(&event).unwrap())
            .await
            .unwrap();
        store
            .set(
                collections::USERS,
                "u1",
                to_fields(&UserProfile {
                    uid: "u1".to_string(),
                    display_name: "Sam".to_string(),
                    ..Default::default()
                })
                .unwrap(),
            )
            .await
            .unwrap();
        store
    }

    fn service(store: Arc<MemoryStore>, policy: CommitPolicy) -> LeaderboardService {
        LeaderboardService::new(store, policy, Duration::from_secs(5))
    }

    async fn stored_event(store: &MemoryStore) -> Event {
        get_as::<Event>(store, collections::EVENTS, "e1")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_quick_add_snapshots_name() {
        let store = store_with_event(vec![]).await;
        let svc = service(store.clone(), CommitPolicy::LastWriterWins);

        svc.quick_add("e1", BoardKind::Main, input("u1", Some(3), Some(15)))
            .await
            .unwrap();
        svc.quick_add("e1", BoardKind::Main, input("ghost", Some(2), Some(50)))
            .await
            .unwrap();

        let event = stored_event(&store).await;
        let board = &event.main_leaderboard.entries;
        assert_eq!(board[0].user_name, "Unknown");
        assert_eq!(board[0].time, "170");
        assert_eq!(board[1].user_name, "Sam");
        assert!(event.locker_wod_leaderboard.is_empty());
        assert!(event.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_quick_add_rejects_invalid_input_first() {
        let store = store_with_event(vec![]).await;
        let svc = service(store, CommitPolicy::LastWriterWins);

        let err = svc
            .quick_add("missing", BoardKind::Main, input("u1", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc
            .quick_add("missing", BoardKind::Main, input("u1", Some(1), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_last_writer_wins_loses_concurrent_add() {
        let store = store_with_event(vec![entry("seed", "300")]).await;
        let svc = service(store.clone(), CommitPolicy::LastWriterWins);

        let mut a = svc.load("e1").await.unwrap();
        let mut b = svc.load("e1").await.unwrap();

        a.add_entry(BoardKind::Main, entry("x", "100")).unwrap();
        svc.commit(&mut a).await.unwrap();

        b.add_entry(BoardKind::Main, entry("y", "200")).unwrap();
        svc.commit(&mut b).await.unwrap();

        let event = stored_event(&store).await;
        assert_eq!(ids(&event.main_leaderboard), vec!["y", "seed"]);
    }

    #[tokio::test]
    async fn test_version_checked_rejects_stale_session() {
        let store = store_with_event(vec![entry("seed", "300")]).await;
        let svc = service(store.clone(), CommitPolicy::VersionChecked);

        let mut a = svc.load("e1").await.unwrap();
        let mut b = svc.load("e1").await.unwrap();

        a.add_entry(BoardKind::Main, entry("x", "100")).unwrap();
        svc.commit(&mut a).await.unwrap();

        b.add_entry(BoardKind::Main, entry("y", "200")).unwrap();
        let err = svc.commit(&mut b).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(matches!(b.state(), SessionState::Error(_)));

        let event = stored_event(&store).await;
        assert_eq!(ids(&event.main_leaderboard), vec!["x", "seed"]);
        assert_eq!(event.version, 1);

        // Refetch, reapply and retry.
        let fresh = svc.load("e1").await.unwrap();
        let mut retry = fresh.clone();
        retry.add_entry(BoardKind::Main, entry("y", "200")).unwrap();
        svc.commit(&mut retry).await.unwrap();
        let event = stored_event(&store).await;
        assert_eq!(ids(&event.main_leaderboard), vec!["x", "y", "seed"]);
    }

    #[test]
    fn test_normalize_sorts_stably() {
        let mut board = Leaderboard::new(vec![
            entry("dnf", "DNF"),
            entry("slow", "300"),
            entry("a", "100"),
            entry("b", "100"),
        ]);
        board.normalize();
        assert_eq!(ids(&board), vec!["a", "b", "slow", "dnf"]);
    }

    #[tokio::test]
    async fn test_last_writer_wins_bumps_stored_version() {
        let store = store_with_event(vec![]).await;
        let svc = service(store.clone(), CommitPolicy::LastWriterWins);

        svc.quick_add("e1", BoardKind::Main, input("u1", Some(3), None))
            .await
            .unwrap();
        svc.quick_add("e1", BoardKind::Main, input("u2", Some(4), None))
            .await
            .unwrap();

        let version = svc
            .save(LeaderboardWrite {
                event_id: "e1".to_string(),
                main: Leaderboard::new(vec![entry("z", "500"), entry("y", "50")]),
                locker: Leaderboard::default(),
                base_version: 0,
            })
            .await
            .unwrap();
        assert_eq!(version, 3);

        let event = stored_event(&store).await;
        assert_eq!(event.version, 3);
        assert_eq!(ids(&event.main_leaderboard), vec!["y", "z"]);
    }

    #[tokio::test]
    async fn test_commit_missing_event_is_not_found() {
        let store = store_with_event(vec![]).await;
        let svc = service(store.clone(), CommitPolicy::LastWriterWins);

        let mut session = svc.load("e1").await.unwrap();
        store.delete(collections::EVENTS, "e1").await.unwrap();

        session.add_entry(BoardKind::Locker, entry("a", "60")).unwrap();
        let err = svc.commit(&mut session).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(session.board(BoardKind::Locker).len(), 1);
    }
}
