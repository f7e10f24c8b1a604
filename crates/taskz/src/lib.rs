//! # taskz
//!
//! The persistence and data-integrity core of a local-first task list: a task
//! collection that survives an unavailable, full or corrupted storage medium.
//!
//! ## Architecture
//!
//! ```text
//! UI ──► api::TaskzApi ──► commands::* ──► manager::TaskManager ──► store::TaskStore
//!                                                                    ├─ backup
//!                                                                    ├─ migrate
//!                                                                    ├─ validate
//!                                                                    └─ adapter ─► FsBackend | MemBackend
//! ```
//!
//! - [`api`]: thin facade, the single entry point for a UI
//! - [`commands`]: one module per operation, structured [`commands::CmdResult`] returns
//! - [`manager`]: the authoritative in-memory collection and every mutation rule
//! - [`store`]: envelopes, backup/restore, validation, migration, medium fallback
//! - [`model`]: the [`model::Task`] record and the persisted JSON shapes
//! - [`config`], [`init`]: configuration loading and startup wiring
//!
//! ## Usage
//!
//! ```ignore
//! use taskz::init::initialize;
//! use taskz::model::NewTask;
//!
//! let mut ctx = initialize(None);
//! let result = ctx.api.create_task(NewTask::new("Water the plants"))?;
//! assert!(result.success());
//! ```
//!
//! ## Logging
//!
//! Recovery paths (memory fallback, backup restore, migration, quota cleanup) log through
//! `tracing` under `taskz::*` targets. The library never installs a subscriber.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod manager;
pub mod model;
pub mod store;

#[cfg(test)]
pub mod test_utils;
