//! Theme and color definitions for rich output.
//!
//! - Status: green (open) → yellow (in-progress) → blue (resolved) → gray (closed)
//! - Priority: red+bold (high) → yellow (medium) → gray (low)

use crate::model::{Priority, Status};
use rich_rust::{Color, Style};

/// Parse a standard color name; only called with literals below.
fn color(name: &str) -> Color {
    Color::parse(name).unwrap_or_else(|_| panic!("Invalid color name: {name}"))
}

/// Styles shared by the rich output components.
#[derive(Debug, Clone)]
pub struct Theme {
    pub status_open: Style,
    pub status_in_progress: Style,
    pub status_resolved: Style,
    pub status_closed: Style,

    pub priority_high: Style,
    pub priority_medium: Style,
    pub priority_low: Style,

    pub header: Style,
    pub section: Style,
    pub panel_title: Style,
    pub dimmed: Style,
    pub emphasis: Style,
    pub success: Style,
    pub warning: Style,

    pub ticket_id: Style,
    pub category: Style,
    pub assignee: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status_open: Style::new().color(color("green")),
            status_in_progress: Style::new().color(color("yellow")),
            status_resolved: Style::new().color(color("blue")),
            status_closed: Style::new().color(color("bright_black")),

            priority_high: Style::new().color(color("red")).bold(),
            priority_medium: Style::new().color(color("yellow")),
            priority_low: Style::new().color(color("bright_black")),

            header: Style::new().bold(),
            section: Style::new().color(color("cyan")).bold(),
            panel_title: Style::new().bold(),
            dimmed: Style::new().color(color("bright_black")),
            emphasis: Style::new().bold(),
            success: Style::new().color(color("green")),
            warning: Style::new().color(color("yellow")),

            ticket_id: Style::new().color(color("cyan")),
            category: Style::new().color(color("magenta")),
            assignee: Style::new().color(color("blue")),
        }
    }

    #[must_use]
    pub const fn status_style(&self, status: Status) -> &Style {
        match status {
            Status::Open => &self.status_open,
            Status::InProgress => &self.status_in_progress,
            Status::Resolved => &self.status_resolved,
            Status::Closed => &self.status_closed,
        }
    }

    #[must_use]
    pub const fn priority_style(&self, priority: Priority) -> &Style {
        match priority {
            Priority::High => &self.priority_high,
            Priority::Medium => &self.priority_medium,
            Priority::Low => &self.priority_low,
        }
    }
}
