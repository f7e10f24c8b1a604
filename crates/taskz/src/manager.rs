//! # Task Collection Manager
//!
//! [`TaskManager`] owns the authoritative in-memory collection. Every mutation
//! goes through it, is validated here, and ends in a single save through the
//! [`TaskStore`].
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► pending ◄──► completed
//!               │             │
//!               └── delete ───┘ (terminal)
//! ```
//!
//! ## Id Assignment
//!
//! On load the counter starts at `max(id) + 1` (or 1 for an empty collection)
//! and is post-incremented on every create or import. Ids are unique within a
//! process; two processes sharing one medium can collide (last writer wins).
//!
//! ## Saves
//!
//! Mutations that change nothing do not save. Bulk operations save once.
//! A failed save does not fail the mutation: the in-memory collection stays
//! authoritative, the failure is logged, and a warning is parked for the caller
//! to pick up with [`TaskManager::take_storage_warning`]. The next save
//! re-attempts persistence.

use crate::error::{Result, TaskzError};
use crate::model::{
    categories_of, ExportPayload, NewTask, Priority, Task, TaskUpdate, FALLBACK_CATEGORY,
};
use crate::store::backend::StorageBackend;
use crate::store::validate::validate_import;
use crate::store::{LoadResult, LoadSource, SaveOptions, StorageInfo, TaskStore};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

/// Filter criteria; every set field must match (AND).
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn matches(&self, task: &Task, needle: Option<&str>) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        };
        status_ok
            && self.priority.map_or(true, |p| task.priority == p)
            && self
                .category
                .as_deref()
                .map_or(true, |c| task.category == c)
            && needle.map_or(true, |n| task.matches_text(n))
    }
}

/// Lowercased, trimmed search term, or `None` when blank.
fn search_needle(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority: usize,
    pub overdue: usize,
    /// Whole percent, 0 for an empty collection.
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub tasks: Vec<Task>,
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>> {
    raw.map(str::parse::<Priority>).transpose()
}

fn validated_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskzError::Validation("Task title is required".to_string()));
    }
    Ok(title.to_string())
}

fn non_blank_category(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Import acceptance rule: non-empty string title, boolean `completed`,
/// recognized priority.
fn is_importable(task: &Value) -> bool {
    let title_ok = task
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    let completed_ok = task.get("completed").is_some_and(Value::is_boolean);
    let priority_ok = task
        .get("priority")
        .and_then(Value::as_str)
        .is_some_and(|p| p.parse::<Priority>().is_ok());
    title_ok && completed_ok && priority_ok
}

/// Decode an external record under a fresh id. `None` if it does not decode.
fn decode_with_id(mut raw: Value, id: u64) -> Option<Task> {
    let obj = raw.as_object_mut()?;
    obj.insert("id".to_string(), Value::from(id));
    serde_json::from_value(raw).ok()
}

fn parse_payload(json: &str) -> Result<Value> {
    let payload: Value = serde_json::from_str(json)
        .map_err(|e| TaskzError::Format(format!("Invalid JSON: {}", e)))?;
    if !payload.get("tasks").is_some_and(Value::is_array) {
        return Err(TaskzError::Format(
            "Invalid task data format: expected a `tasks` array".to_string(),
        ));
    }
    Ok(payload)
}

pub struct TaskManager<B: StorageBackend> {
    tasks: Vec<Task>,
    next_id: u64,
    store: TaskStore<B>,
    last_load: LoadSource,
    storage_warning: Option<String>,
}

impl<B: StorageBackend> TaskManager<B> {
    /// Build the manager and populate it from storage.
    pub fn open(store: TaskStore<B>) -> Self {
        let mut manager = Self {
            tasks: Vec::new(),
            next_id: 1,
            store,
            last_load: LoadSource::Default,
            storage_warning: None,
        };
        manager.reload();
        manager
    }

    pub fn with_backend(backend: B) -> Self {
        Self::open(TaskStore::with_backend(backend))
    }

    /// Re-read the collection from storage and reset the id counter.
    pub fn reload(&mut self) -> LoadResult {
        let loaded = self.store.load_tasks();
        self.tasks = loaded.tasks.clone();
        // Loaded ids are below u64::MAX, so the successor always exists
        self.next_id = self
            .tasks
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        self.last_load = loaded.source;
        if loaded.restored {
            info!(target: "taskz::manager", tasks = self.tasks.len(), "Collection restored from backup");
        }
        loaded
    }

    pub fn store(&self) -> &TaskStore<B> {
        &self.store
    }

    pub fn last_load(&self) -> LoadSource {
        self.last_load
    }

    /// The warning left by the most recent failed save, if any.
    pub fn take_storage_warning(&mut self) -> Option<String> {
        self.storage_warning.take()
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.store.storage_info()
    }

    fn save(&mut self) {
        self.save_with(SaveOptions::default());
    }

    fn save_with(&mut self, options: SaveOptions) {
        match self.store.save_tasks(&self.tasks, options) {
            Ok(_) => self.storage_warning = None,
            Err(e) => {
                warn!(target: "taskz::manager", error = %e, "Changes kept in memory only");
                self.storage_warning = Some(match e {
                    TaskzError::QuotaExceeded => {
                        "Storage quota exceeded. Clear old data and try again.".to_string()
                    }
                    other => format!("Could not save tasks: {}", other),
                });
            }
        }
    }

    fn take_id(&mut self) -> Result<u64> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| TaskzError::Store("Task ids exhausted".to_string()))?;
        Ok(id)
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    // --- Reads ---

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        categories_of(&self.tasks)
    }

    // --- Mutations ---

    pub fn create(&mut self, input: NewTask) -> Result<Task> {
        let title = validated_title(&input.title)?;
        let priority = parse_priority(input.priority.as_deref())?.unwrap_or_default();

        let mut task = Task::new(self.take_id()?, &title, Utc::now());
        task.description = input.description.unwrap_or_default().trim().to_string();
        task.priority = priority;
        task.category = non_blank_category(input.category.as_deref())
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
        task.due_date = input.due_date;

        debug!(target: "taskz::manager", id = task.id, "Task created");
        self.tasks.push(task.clone());
        self.save();
        Ok(task)
    }

    pub fn update(&mut self, id: u64, update: TaskUpdate) -> Result<Task> {
        let idx = self.position(id).ok_or(TaskzError::NotFound(id))?;
        let title = update.title.as_deref().map(validated_title).transpose()?;
        let priority = parse_priority(update.priority.as_deref())?;

        let now = Utc::now();
        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description.trim().to_string();
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(category) = update.category {
            task.category = non_blank_category(Some(category.as_str()))
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = update.completed {
            task.set_completed(completed, now);
        }
        task.updated_at = now.max(task.created_at);

        let updated = task.clone();
        self.save();
        Ok(updated)
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.tasks.remove(idx);
        self.save();
        true
    }

    /// Flip completion. `None` if the id is unknown.
    pub fn toggle(&mut self, id: u64) -> Option<Task> {
        let completed = self.get(id)?.completed;
        self.update(id, TaskUpdate::new().completed(!completed)).ok()
    }

    pub fn mark_all_completed(&mut self) -> usize {
        let now = Utc::now();
        let mut count = 0;
        for task in self.tasks.iter_mut().filter(|t| !t.completed) {
            task.set_completed(true, now);
            task.updated_at = now.max(task.created_at);
            count += 1;
        }
        if count > 0 {
            self.save();
        }
        count
    }

    pub fn delete_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.save();
        }
        removed
    }

    /// Empty the collection and restart ids at 1. Returns the number cleared.
    pub fn clear_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        self.next_id = 1;
        self.save();
        count
    }

    /// Delete the stored collection itself, keeping a final backup of it.
    /// The next load finds no saved tasks. Returns the number cleared.
    pub fn wipe_storage(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        self.next_id = 1;
        match self.store.clear_all_data() {
            Ok(()) => self.storage_warning = None,
            Err(e) => {
                warn!(target: "taskz::manager", error = %e, "Stored tasks could not be removed");
                self.storage_warning = Some(format!("Could not clear stored tasks: {}", e));
            }
        }
        count
    }

    // --- Queries ---

    pub fn filter(&self, filter: &TaskFilter) -> Vec<Task> {
        let needle = search_needle(filter.search.as_deref());
        self.tasks
            .iter()
            .filter(|t| filter.matches(t, needle.as_deref()))
            .cloned()
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Task> {
        self.filter(&TaskFilter::default().search(query))
    }

    pub fn overdue_tasks_on(&self, today: NaiveDate) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_overdue(today))
            .cloned()
            .collect()
    }

    pub fn overdue_tasks(&self) -> Vec<Task> {
        self.overdue_tasks_on(today())
    }

    pub fn tasks_due_on(&self, day: NaiveDate) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_due_on(day))
            .cloned()
            .collect()
    }

    pub fn tasks_due_today(&self) -> Vec<Task> {
        self.tasks_due_on(today())
    }

    pub fn statistics_on(&self, today: NaiveDate) -> Statistics {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let high_priority = self
            .tasks
            .iter()
            .filter(|t| !t.completed && t.priority == Priority::High)
            .count();
        let overdue = self.tasks.iter().filter(|t| t.is_overdue(today)).count();
        let completion_rate = if total == 0 {
            0
        } else {
            (completed as f64 * 100.0 / total as f64).round() as u32
        };

        Statistics {
            total,
            completed,
            pending: total - completed,
            high_priority,
            overdue,
            completion_rate,
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics_on(today())
    }

    /// Tasks grouped by category, groups in first-seen order.
    pub fn group_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for task in &self.tasks {
            match groups.iter_mut().find(|g| g.category == task.category) {
                Some(group) => group.tasks.push(task.clone()),
                None => groups.push(CategoryGroup {
                    category: task.category.clone(),
                    tasks: vec![task.clone()],
                }),
            }
        }
        groups
    }

    // --- Import / Export ---

    /// Append valid tasks from an export file under fresh ids. Invalid
    /// elements are skipped. Returns the number imported.
    pub fn import_tasks(&mut self, json: &str) -> Result<usize> {
        let mut payload = parse_payload(json)?;
        let Value::Array(elements) = payload["tasks"].take() else {
            return Ok(0);
        };

        let mut imported = 0;
        let mut skipped = 0;
        let mut exhausted = None;
        for raw in elements {
            if !is_importable(&raw) {
                skipped += 1;
                continue;
            }
            let Some(task) = decode_with_id(raw, self.next_id) else {
                skipped += 1;
                continue;
            };
            if let Err(e) = self.take_id() {
                exhausted = Some(e);
                break;
            }
            self.tasks.push(task);
            imported += 1;
        }

        if skipped > 0 {
            debug!(target: "taskz::manager", skipped, "Skipped invalid import entries");
        }
        if imported > 0 {
            self.save();
        }
        match exhausted {
            Some(e) => Err(e),
            None => Ok(imported),
        }
    }

    /// Pretty-printed export of the whole collection. Does not mutate.
    pub fn export_tasks(&self) -> Result<String> {
        let payload = ExportPayload {
            tasks: &self.tasks,
            export_date: Utc::now(),
            version: self.store.schema_version(),
            total_tasks: self.tasks.len(),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Replace the whole collection with the contents of an export file.
    ///
    /// The current envelope is snapshotted first; ids are renumbered from 1.
    /// Returns the number of tasks now in the collection.
    pub fn replace_from_export(&mut self, json: &str) -> Result<usize> {
        let mut payload: Value = serde_json::from_str(json)
            .map_err(|e| TaskzError::Format(format!("Invalid JSON: {}", e)))?;
        if !validate_import(&payload) {
            return Err(TaskzError::Format("Invalid data format".to_string()));
        }
        let Value::Array(elements) = payload["tasks"].take() else {
            return Err(TaskzError::Format("Invalid data format".to_string()));
        };

        let mut tasks = Vec::with_capacity(elements.len());
        for (i, raw) in elements.into_iter().enumerate() {
            let position = i + 1;
            let task = decode_with_id(raw, tasks.len() as u64 + 1).ok_or_else(|| {
                TaskzError::Format(format!("Task {} could not be decoded", position))
            })?;
            if task.title.is_empty() {
                return Err(TaskzError::Format(format!("Task {} has an empty title", position)));
            }
            tasks.push(task);
        }

        self.store.snapshot();
        self.tasks = tasks;
        self.next_id = self.tasks.len() as u64 + 1;
        self.save_with(SaveOptions::without_backup());
        Ok(self.tasks.len())
    }
}

/// The current calendar day in UTC.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
