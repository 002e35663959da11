//! Core data types: tickets and the comments/attachments they own.
//!
//! Priority and status are closed enums that serialize to the same strings
//! stored in the database (`low`/`medium`/`high`,
//! `open`/`in-progress`/`resolved`/`closed`).

use crate::error::{Result, TicketError};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category assigned when a ticket is created without one.
pub const DEFAULT_CATEGORY: &str = "other";

/// Author recorded on comments when the caller does not name one.
pub const DEFAULT_AUTHOR: &str = "User";

/// Ticket priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TicketError::validation(
                "priority",
                format!("unknown priority '{other}' (expected low, medium or high)"),
            )),
        }
    }
}

/// Ticket workflow status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    #[serde(alias = "in_progress")]
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Resolved and closed tickets count as finished work.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(TicketError::validation(
                "status",
                format!("unknown status '{other}' (expected open, in-progress, resolved or closed)"),
            )),
        }
    }
}

/// A support ticket together with its comments and attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub category: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set the first time the ticket reaches resolved or closed. Never cleared.
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Category used for reporting; missing or empty values count as "other".
    #[must_use]
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// Comment on a ticket. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reference to an uploaded file. The bytes live outside the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attachment {
    pub id: i64,
    pub ticket_id: i64,
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new ticket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub category: Option<String>,
    pub status: Option<Status>,
}

/// Fields for a new attachment row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewAttachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub path: String,
}
