//! Plain-text formatting helpers shared by every human-readable mode.

use crate::model::{Comment, Priority, Status, Ticket};
use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DEFAULT_WIDTH: usize = 80;

/// Determine terminal width from `COLUMNS`, then the terminal, then 80.
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }

    if let Ok((cols, _)) = crossterm::terminal::size() {
        if cols > 0 {
            return usize::from(cols).max(DEFAULT_WIDTH);
        }
    }

    DEFAULT_WIDTH
}

/// Truncate `title` to at most `max_width` display columns, ending in `…`.
#[must_use]
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in title.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Open => "○",
        Status::InProgress => "◐",
        Status::Resolved => "●",
        Status::Closed => "✓",
    }
}

#[must_use]
pub fn format_priority_label(priority: Priority) -> String {
    priority.as_str().to_uppercase()
}

#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// One-line summary: `○ #12 [HIGH] Printer jam (alice, hardware)`.
#[must_use]
pub fn format_ticket_line(ticket: &Ticket, max_title_width: Option<usize>) -> String {
    let title = max_title_width.map_or_else(
        || ticket.title.clone(),
        |w| truncate_title(&ticket.title, w),
    );
    format!(
        "{} #{} [{}] {} ({}, {})",
        format_status_icon(ticket.status),
        ticket.id,
        format_priority_label(ticket.priority),
        title,
        ticket.assignee,
        ticket.category_or_default(),
    )
}

/// Comment header line followed by its content.
#[must_use]
pub fn format_comment_block(comment: &Comment) -> String {
    format!(
        "[{}] at {}\n{}",
        comment.author,
        format_timestamp(&comment.created_at),
        comment.content.trim_end_matches('\n')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncate_keeps_short_titles() {
        assert_eq!(truncate_title("Printer jam", 20), "Printer jam");
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate_title("Printer jam on floor 3", 10), "Printer j…");
        // Wide glyphs take two columns each.
        assert_eq!(truncate_title("打印机卡纸了", 5), "打印…");
        assert_eq!(truncate_title("anything", 0), "");
    }

    #[test]
    fn ticket_line_includes_default_category() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let ticket = Ticket {
            id: 7,
            title: "VPN drops".to_string(),
            description: "Every hour".to_string(),
            priority: Priority::High,
            assignee: "bob".to_string(),
            category: None,
            status: Status::InProgress,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            attachments: vec![],
            comments: vec![],
        };
        assert_eq!(
            format_ticket_line(&ticket, None),
            "◐ #7 [HIGH] VPN drops (bob, other)"
        );
    }

    #[test]
    fn timestamp_is_minute_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 59).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-09 14:30");
    }
}
