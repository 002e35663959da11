//! `SQLite` storage layer for `ticket_desk`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - WAL mode for concurrent reads
//! - One IMMEDIATE transaction per mutation
//! - Foreign keys with `ON DELETE CASCADE` from comments/attachments to tickets
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main `SQLite` storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{ListFilters, SortColumn, SortOrder, SortSpec, SqliteStorage, TicketUpdate};
