//! # Domain Model: Tasks and Persisted Envelopes
//!
//! This module defines the [`Task`] record and the JSON shapes that wrap it on disk:
//! the persisted [`Envelope`], the [`BackupEnvelope`] and the [`ExportPayload`].
//!
//! ## The Task Record
//!
//! | Field | Type | Notes |
//! |-------|------|-------|
//! | `id` | `u64` | Sequential, immutable |
//! | `title` | `String` | Trimmed, never empty |
//! | `description` | `String` | May be empty |
//! | `priority` | [`Priority`] | `low`, `medium` (default), `high` |
//! | `category` | `String` | Defaults to [`FALLBACK_CATEGORY`] |
//! | `completed` | `bool` | |
//! | `createdAt` / `updatedAt` | RFC 3339 | `updatedAt >= createdAt` |
//! | `dueDate` | `YYYY-MM-DD` | Optional |
//! | `completedAt` | RFC 3339 | Present iff `completed` |
//!
//! ## Lenient Decoding
//!
//! Records come back from storage and import files written by older versions (or by
//! hand). Decoding goes through a permissive helper: missing or malformed optional
//! fields are filled with creation defaults, and the timestamp invariants are
//! re-established. Only `id` and `title` are strictly required.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TaskzError;

/// Category assigned to tasks created without one.
pub const FALLBACK_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TaskzError::Validation(format!("Invalid priority level: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds a fresh, pending task. Inputs are expected to be validated already.
    pub fn new(id: u64, title: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            description: String::new(),
            priority: Priority::default(),
            category: FALLBACK_CATEGORY.to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
            due_date: None,
            completed_at: None,
        }
    }

    /// Sets the completion flag and keeps `completed_at` in step with it.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.completed = completed;
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.completed && self.due_date == Some(day)
    }

    /// Case-insensitive substring match over title, description and category.
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

// Permissive on-disk shape. Everything except `id` and `title` may be missing
// or malformed; see `From<TaskHelper> for Task`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskHelper {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a `YYYY-MM-DD` date, returning `None` for anything else.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

impl From<TaskHelper> for Task {
    fn from(helper: TaskHelper) -> Self {
        let now = Utc::now();
        let created_at = parse_timestamp(helper.created_at.as_deref()).unwrap_or(now);
        let updated_at = parse_timestamp(helper.updated_at.as_deref())
            .unwrap_or(created_at)
            .max(created_at);
        let completed_at = if helper.completed {
            Some(parse_timestamp(helper.completed_at.as_deref()).unwrap_or(updated_at))
        } else {
            None
        };

        Task {
            id: helper.id,
            title: helper.title.trim().to_string(),
            description: helper.description.unwrap_or_default(),
            priority: helper
                .priority
                .and_then(|p| p.parse().ok())
                .unwrap_or_default(),
            category: helper
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            completed: helper.completed,
            created_at,
            updated_at,
            due_date: helper.due_date.as_deref().and_then(parse_due_date),
            completed_at,
        }
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        TaskHelper::deserialize(deserializer).map(Task::from)
    }
}

/// Input for creating a task. Priority arrives as raw text from the UI and is
/// validated by the manager.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update. `None` leaves the field untouched; `due_date: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Distinct categories in first-seen order.
pub fn categories_of(tasks: &[Task]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for task in tasks {
        if !seen.iter().any(|c| c == &task.category) {
            seen.push(task.category.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub categories: Vec<String>,
}

impl EnvelopeMetadata {
    pub fn derive(tasks: &[Task]) -> Self {
        Self {
            total_tasks: tasks.len(),
            completed_tasks: tasks.iter().filter(|t| t.completed).count(),
            categories: categories_of(tasks),
        }
    }
}

/// The primary persisted object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub tasks: Vec<Task>,
    pub timestamp: DateTime<Utc>,
    pub schema_version: String,
    pub metadata: EnvelopeMetadata,
}

impl Envelope {
    pub fn new(tasks: &[Task], schema_version: &str) -> Self {
        Self {
            tasks: tasks.to_vec(),
            timestamp: Utc::now(),
            schema_version: schema_version.to_string(),
            metadata: EnvelopeMetadata::derive(tasks),
        }
    }
}

/// Point-in-time copy of the serialized primary envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub data: String,
    pub timestamp: DateTime<Utc>,
    pub schema_version: String,
}

/// Shape written by export and accepted by import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload<'a> {
    pub tasks: &'a [Task],
    pub export_date: DateTime<Utc>,
    pub version: &'a str,
    pub total_tasks: usize,
}
