//! # Command Layer
//!
//! Each operation the UI can trigger lives in its own submodule as a plain
//! `run` function over a [`TaskManager`]. Commands package the manager's answer
//! into a [`CmdResult`] and never print, prompt or format for a terminal.
//!
//! ## Structured Returns
//!
//! [`CmdResult`] carries:
//! - `affected_tasks`: tasks created or modified by the operation
//! - `listed_tasks`: tasks to display (filters, searches, due lists)
//! - `groups`: tasks grouped by category
//! - `statistics`, `export`, `storage`: payloads for the few commands that produce them
//! - `messages`: leveled messages (info, success, warning, error)
//!
//! A UI that only needs `{success, message}` uses [`CmdResult::success`] and
//! [`CmdResult::message`].
//!
//! ## Errors
//!
//! Input errors (validation, unknown id, bad import file) are not exceptional for a
//! UI, so [`outcome`] turns them into an error-level message on an otherwise empty
//! result. Anything else still propagates as `Err`. A save that failed after the
//! in-memory change succeeded is reported as a warning message.
//!
//! ## Command Modules
//!
//! - [`create`]: Create a task
//! - [`get`]: Fetch one task
//! - [`list`]: Filter, search, overdue, due today, group by category
//! - [`update`]: Patch a task, toggle completion
//! - [`delete`]: Delete one task, delete all completed
//! - [`complete`]: Mark every task completed
//! - [`clear`]: Empty the collection, or wipe the stored copy
//! - [`stats`]: Collection statistics
//! - [`import`]: Append from, or replace with, an export file
//! - [`export`]: Serialize the collection
//! - [`doctor`]: Storage diagnostics and stale-key cleanup
//! - [`reload`]: Re-read the collection from storage

use crate::error::Result;
use crate::manager::{CategoryGroup, Statistics, TaskManager};
use crate::model::Task;
use crate::store::backend::StorageBackend;
use crate::store::StorageInfo;
use serde::Serialize;

pub mod clear;
pub mod complete;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod export;
pub mod get;
pub mod import;
pub mod list;
pub mod reload;
pub mod stats;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CmdResult {
    pub affected_tasks: Vec<Task>,
    pub listed_tasks: Vec<Task>,
    pub groups: Vec<CategoryGroup>,
    pub statistics: Option<Statistics>,
    pub export: Option<String>,
    pub storage: Option<StorageInfo>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.affected_tasks = tasks;
        self
    }

    pub fn with_listed_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.listed_tasks = tasks;
        self
    }

    pub fn with_groups(mut self, groups: Vec<CategoryGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn with_export(mut self, export: String) -> Self {
        self.export = Some(export);
        self
    }

    pub fn with_storage(mut self, storage: StorageInfo) -> Self {
        self.storage = Some(storage);
        self
    }

    /// True unless an error-level message was recorded.
    pub fn success(&self) -> bool {
        !self
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }

    /// The headline: the first error if any, else the first message.
    pub fn message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.level == MessageLevel::Error)
            .or_else(|| self.messages.first())
            .map(|m| m.content.as_str())
    }
}

/// Turn input errors into an error-level message. Other errors pass through.
pub fn outcome(result: Result<CmdResult>) -> Result<CmdResult> {
    match result {
        Err(e) if e.is_user_error() => {
            let mut failed = CmdResult::default();
            failed.add_message(CmdMessage::error(e.to_string()));
            Ok(failed)
        }
        other => other,
    }
}

/// Append the warning left by a failed save, if there is one.
pub(crate) fn push_storage_warning<B: StorageBackend>(
    manager: &mut TaskManager<B>,
    result: &mut CmdResult,
) {
    if let Some(warning) = manager.take_storage_warning() {
        result.add_message(CmdMessage::warning(warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskzError;

    #[test]
    fn success_tracks_error_messages() {
        let mut result = CmdResult::default();
        assert!(result.success());
        assert_eq!(result.message(), None);

        result.add_message(CmdMessage::success("Task created"));
        result.add_message(CmdMessage::warning("Could not save"));
        assert!(result.success());
        assert_eq!(result.message(), Some("Task created"));

        result.add_message(CmdMessage::error("boom"));
        assert!(!result.success());
        assert_eq!(result.message(), Some("boom"));
    }

    #[test]
    fn outcome_converts_user_errors() {
        let result = outcome(Err(TaskzError::NotFound(3))).unwrap();
        assert!(!result.success());
        assert_eq!(result.message(), Some("Task not found: 3"));

        let result = outcome(Err(TaskzError::Validation("Task title is required".into()))).unwrap();
        assert!(result.message().unwrap().contains("Task title is required"));
    }

    #[test]
    fn outcome_passes_storage_errors() {
        let err = outcome(Err(TaskzError::QuotaExceeded)).unwrap_err();
        assert!(matches!(err, TaskzError::QuotaExceeded));
    }
}
