//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for a UI.
//!
//! The facade:
//! - **Dispatches** to the matching `commands::*` function
//! - **Normalizes outcomes** through [`commands::outcome`], so validation, not-found and
//!   format errors arrive as error-level messages rather than `Err`
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It holds no logic of its own: no validation, no persistence, no formatting.
//!
//! ## Generic Over StorageBackend
//!
//! `TaskzApi<B: StorageBackend>`:
//! - Production: `TaskzApi<FsBackend>`
//! - Testing: `TaskzApi<MemBackend>`
//!
//! API tests check that each method reaches the right command and that input errors
//! are folded into messages; command behavior is tested in the command modules.

use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::manager::{TaskFilter, TaskManager};
use crate::model::{NewTask, TaskUpdate};
use crate::store::backend::StorageBackend;

pub struct TaskzApi<B: StorageBackend> {
    manager: TaskManager<B>,
}

impl<B: StorageBackend> TaskzApi<B> {
    pub fn new(manager: TaskManager<B>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &TaskManager<B> {
        &self.manager
    }

    pub fn create_task(&mut self, input: NewTask) -> Result<CmdResult> {
        commands::outcome(commands::create::run(&mut self.manager, input))
    }

    pub fn get_task(&self, id: u64) -> Result<CmdResult> {
        commands::outcome(commands::get::run(&self.manager, id))
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<CmdResult> {
        commands::list::run(&self.manager, filter)
    }

    pub fn search_tasks(&self, query: &str) -> Result<CmdResult> {
        commands::list::search(&self.manager, query)
    }

    pub fn overdue_tasks(&self) -> Result<CmdResult> {
        commands::list::overdue(&self.manager)
    }

    pub fn tasks_due_today(&self) -> Result<CmdResult> {
        commands::list::due_today(&self.manager)
    }

    pub fn tasks_by_category(&self) -> Result<CmdResult> {
        commands::list::by_category(&self.manager)
    }

    pub fn update_task(&mut self, id: u64, update: TaskUpdate) -> Result<CmdResult> {
        commands::outcome(commands::update::run(&mut self.manager, id, update))
    }

    pub fn toggle_task(&mut self, id: u64) -> Result<CmdResult> {
        commands::outcome(commands::update::toggle(&mut self.manager, id))
    }

    pub fn delete_task(&mut self, id: u64) -> Result<CmdResult> {
        commands::outcome(commands::delete::run(&mut self.manager, id))
    }

    pub fn delete_completed(&mut self) -> Result<CmdResult> {
        commands::delete::completed(&mut self.manager)
    }

    pub fn complete_all(&mut self) -> Result<CmdResult> {
        commands::complete::all(&mut self.manager)
    }

    pub fn clear_tasks(&mut self) -> Result<CmdResult> {
        commands::clear::run(&mut self.manager)
    }

    pub fn wipe_storage(&mut self) -> Result<CmdResult> {
        commands::clear::wipe(&mut self.manager)
    }

    pub fn statistics(&self) -> Result<CmdResult> {
        commands::stats::run(&self.manager)
    }

    pub fn import_tasks(&mut self, json: &str) -> Result<CmdResult> {
        commands::outcome(commands::import::run(&mut self.manager, json))
    }

    pub fn replace_tasks(&mut self, json: &str) -> Result<CmdResult> {
        commands::outcome(commands::import::replace(&mut self.manager, json))
    }

    pub fn export_tasks(&self) -> Result<CmdResult> {
        commands::export::run(&self.manager)
    }

    pub fn doctor(&mut self) -> Result<CmdResult> {
        commands::doctor::run(&mut self.manager)
    }

    pub fn reload(&mut self) -> Result<CmdResult> {
        commands::reload::run(&mut self.manager)
    }
}
