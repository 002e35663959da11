//! `ticket_desk` - support ticket tracking library
//!
//! This crate provides the core functionality for the `tkt` CLI tool:
//! tickets with comments and file attachments, filtered and sorted listings,
//! and an on-demand KPI report.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Ticket, Comment, Attachment)
//! - [`storage`] - `SQLite` database layer
//! - [`report`] - KPI aggregation
//! - [`validation`] - Request-layer input checks
//! - [`config`] - Workspace discovery and layered configuration
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (rich, plain, JSON)
//! - [`util`] - Utility functions (time parsing, upload storage)

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod report;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, Result, StructuredError, TicketError};
