//! CLI command handlers
//!
//! This module organizes command execution into logical submodules:
//! - `diaries`: entry CRUD, search, favorites, pins, tagging
//! - `todos`: todo CRUD and the open/completed/overdue views
//! - `tags`: tag lifecycle
//! - `categories`: category lifecycle
//! - `settings`: settings display and updates
//! - `transfer`: markdown import and export
//! - `backup`: backup creation, listing and restore
//!
//! Handlers are thin: parse what clap could not, call a service,
//! print. Errors bubble to main where they become one user-facing
//! message.

pub mod backup;
pub mod categories;
pub mod diaries;
pub mod settings;
pub mod tags;
pub mod todos;
pub mod transfer;

/// Short id prefix used in listings; full ids appear in `show` output
pub(crate) fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}
