//! Show command implementation.

use crate::cli::ShowArgs;
use crate::config;
use crate::error::{Result, TicketError};
use crate::format::{
    OutputContext, OutputMode, format_comment_block, format_priority_label, format_timestamp,
    rich,
};
use crate::model::Ticket;
use tracing::info;

/// Execute the show command.
///
/// # Errors
///
/// Returns `TicketNotFound` if the id does not exist, or a storage error.
pub fn execute(args: &ShowArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let workspace = config::open_storage_with_cli(cli)?;
    let ticket = workspace
        .storage
        .get_ticket(args.id)?
        .ok_or(TicketError::TicketNotFound { id: args.id })?;

    info!(ticket_id = ticket.id, "Showing ticket");
    print_ticket(&ticket, ctx)
}

/// Print a ticket in the current output mode.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_ticket(ticket: &Ticket, ctx: &OutputContext) -> Result<()> {
    match ctx.mode() {
        OutputMode::Json => ctx.json_pretty(ticket)?,
        OutputMode::Rich => rich::render_ticket_panel(ticket, ctx),
        OutputMode::Plain => println!("{}", format_ticket_plain(ticket)),
        OutputMode::Quiet => {}
    }
    Ok(())
}

fn format_ticket_plain(ticket: &Ticket) -> String {
    let mut out = format!(
        "#{} {}\nStatus: {}  Priority: {}  Assignee: {}  Category: {}\nCreated: {}  Updated: {}",
        ticket.id,
        ticket.title,
        ticket.status,
        format_priority_label(ticket.priority),
        ticket.assignee,
        ticket.category_or_default(),
        format_timestamp(&ticket.created_at),
        format_timestamp(&ticket.updated_at),
    );
    if let Some(resolved_at) = &ticket.resolved_at {
        out.push_str(&format!("  Resolved: {}", format_timestamp(resolved_at)));
    }
    out.push_str("\n\n");
    out.push_str(ticket.description.trim_end());
    out.push('\n');

    if !ticket.attachments.is_empty() {
        out.push_str(&format!("\nAttachments ({}):\n", ticket.attachments.len()));
        for attachment in &ticket.attachments {
            let size = attachment
                .size_bytes
                .map_or_else(String::new, |b| format!(" ({b} bytes)"));
            out.push_str(&format!(
                "  {}{} {}\n",
                attachment.filename, size, attachment.path
            ));
        }
    }

    if !ticket.comments.is_empty() {
        out.push_str(&format!("\nComments ({}):\n", ticket.comments.len()));
        for comment in &ticket.comments {
            out.push_str(&format_comment_block(comment));
            out.push_str("\n\n");
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, Priority, Status};
    use chrono::{TimeZone, Utc};

    #[test]
    fn plain_output_lists_children() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let ticket = Ticket {
            id: 3,
            title: "Printer jam".to_string(),
            description: "Tray 2".to_string(),
            priority: Priority::Low,
            assignee: "alice".to_string(),
            category: Some("hardware".to_string()),
            status: Status::Resolved,
            created_at: now,
            updated_at: now,
            resolved_at: Some(now),
            attachments: vec![Attachment {
                id: 1,
                ticket_id: 3,
                filename: "jam.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                size_bytes: Some(2048),
                path: "/uploads/3_1714550400_jam.jpg".to_string(),
                created_at: now,
            }],
            comments: vec![],
        };

        let text = format_ticket_plain(&ticket);
        assert!(text.starts_with("#3 Printer jam\nStatus: resolved  Priority: LOW"));
        assert!(text.contains("Resolved: 2024-05-01 08:00"));
        assert!(text.contains("jam.jpg (2048 bytes) /uploads/3_1714550400_jam.jpg"));
        assert!(!text.contains("Comments"));
    }
}
