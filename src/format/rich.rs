//! Rich terminal output components using rich_rust.
//!
//! # Components
//!
//! - [`RichTicketTable`]: tickets in a formatted table (list)
//! - [`RichTicketPanel`]: one ticket with comments and attachments (show)
//! - [`build_kpi_text`]: KPI report body (report)

use crate::format::context::OutputContext;
use crate::format::text::{
    format_priority_label, format_status_icon, format_timestamp, truncate_title,
};
use crate::format::theme::Theme;
use crate::model::{Priority, Status, Ticket};
use crate::report::KpiReport;
use rich_rust::prelude::*;

/// Table of tickets with status, id, priority, assignee, category and title.
pub struct RichTicketTable<'a> {
    tickets: &'a [Ticket],
    theme: &'a Theme,
    max_title_width: Option<usize>,
}

impl<'a> RichTicketTable<'a> {
    #[must_use]
    pub const fn new(tickets: &'a [Ticket], theme: &'a Theme) -> Self {
        Self {
            tickets,
            theme,
            max_title_width: None,
        }
    }

    #[must_use]
    pub const fn max_title_width(mut self, width: usize) -> Self {
        self.max_title_width = Some(width);
        self
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("").width(2))
            .with_column(Column::new("ID").justify(JustifyMethod::Right))
            .with_column(Column::new("Pri").justify(JustifyMethod::Center))
            .with_column(Column::new("Assignee"))
            .with_column(Column::new("Category"))
            .with_column(Column::new("Title"));

        for ticket in self.tickets {
            let title = self.max_title_width.map_or_else(
                || ticket.title.clone(),
                |w| truncate_title(&ticket.title, w),
            );

            let cells = vec![
                Cell::new(format_status_icon(ticket.status))
                    .style(self.theme.status_style(ticket.status).clone()),
                Cell::new(format!("#{}", ticket.id)).style(self.theme.ticket_id.clone()),
                Cell::new(format_priority_label(ticket.priority))
                    .style(self.theme.priority_style(ticket.priority).clone()),
                Cell::new(ticket.assignee.clone()).style(self.theme.assignee.clone()),
                Cell::new(ticket.category_or_default().to_string())
                    .style(self.theme.category.clone()),
                Cell::new(title),
            ];

            table = table.with_row(Row::new(cells));
        }

        table
    }
}

/// Full detail view of a single ticket.
pub struct RichTicketPanel<'a> {
    ticket: &'a Ticket,
    theme: &'a Theme,
}

impl<'a> RichTicketPanel<'a> {
    #[must_use]
    pub const fn new(ticket: &'a Ticket, theme: &'a Theme) -> Self {
        Self { ticket, theme }
    }

    #[must_use]
    pub fn build_text(&self) -> Text {
        let t = self.ticket;
        let theme = self.theme;
        let mut content = Text::new("");

        content.append_styled(
            &format!("{} {}\n", format_status_icon(t.status), t.title),
            theme.emphasis.clone(),
        );

        content.append_styled("Status: ", theme.dimmed.clone());
        content.append_styled(t.status.as_str(), theme.status_style(t.status).clone());
        content.append_styled("    Priority: ", theme.dimmed.clone());
        content.append_styled(
            &format_priority_label(t.priority),
            theme.priority_style(t.priority).clone(),
        );
        content.append("\n");

        content.append_styled("Assignee: ", theme.dimmed.clone());
        content.append_styled(&t.assignee, theme.assignee.clone());
        content.append_styled("    Category: ", theme.dimmed.clone());
        content.append_styled(t.category_or_default(), theme.category.clone());
        content.append("\n");

        content.append_styled("Created: ", theme.dimmed.clone());
        content.append(&format_timestamp(&t.created_at));
        content.append_styled("    Updated: ", theme.dimmed.clone());
        content.append(&format_timestamp(&t.updated_at));
        if let Some(resolved_at) = &t.resolved_at {
            content.append_styled("    Resolved: ", theme.dimmed.clone());
            content.append_styled(&format_timestamp(resolved_at), theme.success.clone());
        }
        content.append("\n\n");

        content.append(t.description.trim_end());
        content.append("\n");

        if !t.attachments.is_empty() {
            content.append_styled(
                &format!("\nAttachments ({})\n", t.attachments.len()),
                theme.section.clone(),
            );
            for attachment in &t.attachments {
                content.append_styled("  \u{2022} ", theme.dimmed.clone());
                content.append(&attachment.filename);
                let size = attachment
                    .size_bytes
                    .map_or_else(String::new, |b| format!(" ({b} bytes)"));
                content.append_styled(
                    &format!("{size} {}\n", attachment.path),
                    theme.dimmed.clone(),
                );
            }
        }

        if !t.comments.is_empty() {
            content.append_styled(
                &format!("\nComments ({})\n", t.comments.len()),
                theme.section.clone(),
            );
            for comment in &t.comments {
                content.append_styled(&format!("  {}", comment.author), theme.emphasis.clone());
                content.append_styled(
                    &format!(" at {}\n", format_timestamp(&comment.created_at)),
                    theme.dimmed.clone(),
                );
                for line in comment.content.lines() {
                    content.append(&format!("    {line}\n"));
                }
            }
        }

        content
    }
}

/// Print the ticket table to the terminal.
pub fn render_ticket_table(tickets: &[Ticket], ctx: &OutputContext) {
    let console = Console::default();
    // Leave room for the fixed columns.
    let title_width = ctx.width().saturating_sub(48).max(20);
    let table = RichTicketTable::new(tickets, ctx.theme()).max_title_width(title_width);
    console.print_renderable(&table.build_table());
}

/// Print one ticket in a panel.
pub fn render_ticket_panel(ticket: &Ticket, ctx: &OutputContext) {
    let console = Console::default();
    let content = RichTicketPanel::new(ticket, ctx.theme()).build_text();
    let panel = Panel::from_rich_text(&content, ctx.width()).title(Text::styled(
        &format!("Ticket #{}", ticket.id),
        ctx.theme().panel_title.clone(),
    ));
    console.print_renderable(&panel);
}

/// KPI report body: overview, priority and category bars, workload rows.
#[must_use]
pub fn build_kpi_text(report: &KpiReport, theme: &Theme) -> Text {
    let mut content = Text::new("");

    content.append_styled("Overview\n", theme.section.clone());
    content.append_styled("   Total: ", theme.dimmed.clone());
    content.append_styled(&report.total_tickets.to_string(), theme.emphasis.clone());
    content.append_styled("    Last 30 days: ", theme.dimmed.clone());
    content.append_styled(&report.recent_30d.to_string(), theme.emphasis.clone());
    content.append_styled("    Avg resolution: ", theme.dimmed.clone());
    content.append_styled(
        &format!("{} days", report.avg_resolution_days),
        theme.success.clone(),
    );
    content.append("\n\n");

    content.append_styled("By Priority\n", theme.section.clone());
    for priority in [Priority::High, Priority::Medium, Priority::Low] {
        append_bar(
            &mut content,
            &format_priority_label(priority),
            report.priority_counts.get(priority),
            report.total_tickets,
            theme.priority_style(priority),
            theme,
        );
    }
    content.append("\n");

    if !report.category_counts.is_empty() {
        content.append_styled("By Category\n", theme.section.clone());
        for (category, count) in &report.category_counts {
            append_bar(
                &mut content,
                category,
                *count,
                report.total_tickets,
                &theme.category,
                theme,
            );
        }
        content.append("\n");
    }

    if !report.assignee_workload.is_empty() {
        content.append_styled("Workload\n", theme.section.clone());
        for (assignee, workload) in &report.assignee_workload {
            content.append_styled(&format!("   {assignee:<16}"), theme.assignee.clone());
            content.append_styled(&format!("{:>4} total", workload.total), theme.emphasis.clone());
            for status in Status::ALL {
                content.append_styled(
                    &format!("  {} {}", workload.get(status), status.as_str()),
                    theme.status_style(status).clone(),
                );
            }
            content.append("\n");
        }
    }

    content
}

/// Print the KPI report in a panel.
pub fn render_kpi_panel(report: &KpiReport, ctx: &OutputContext) {
    let console = Console::default();
    let content = build_kpi_text(report, ctx.theme());
    let panel = Panel::from_rich_text(&content, ctx.width())
        .title(Text::styled("Ticket KPIs", ctx.theme().panel_title.clone()));
    console.print_renderable(&panel);
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn append_bar(
    content: &mut Text,
    label: &str,
    count: usize,
    total: usize,
    style: &Style,
    theme: &Theme,
) {
    let bar_width: usize = 24;
    let total = total.max(1);
    let pct = (count as f64 / total as f64) * 100.0;
    let filled = ((count as f64 / total as f64) * bar_width as f64).round() as usize;
    let empty = bar_width.saturating_sub(filled);

    content.append_styled(&format!("   {label:<12}"), style.clone());
    content.append_styled(&"\u{2588}".repeat(filled), style.clone());
    content.append_styled(&"\u{2591}".repeat(empty), theme.dimmed.clone());
    content.append_styled(&format!(" {count:>3} ({pct:.0}%)"), theme.dimmed.clone());
    content.append("\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;
    use chrono::Utc;

    fn make_ticket(id: i64, title: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            id,
            title: title.to_string(),
            description: "Tray 2 is stuck".to_string(),
            priority: Priority::High,
            assignee: "alice".to_string(),
            category: Some("hardware".to_string()),
            status: Status::Open,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            attachments: vec![],
            comments: vec![Comment {
                id: 1,
                ticket_id: id,
                author: "bob".to_string(),
                content: "On it".to_string(),
                created_at: now,
            }],
        }
    }

    #[test]
    fn test_rich_ticket_table() {
        let tickets = vec![make_ticket(1, "Printer jam"), make_ticket(2, "VPN drops")];
        let theme = Theme::new();
        let _ = RichTicketTable::new(&tickets, &theme)
            .max_title_width(20)
            .build_table();
    }

    #[test]
    fn test_rich_ticket_panel() {
        let ticket = make_ticket(1, "Printer jam");
        let theme = Theme::new();
        let _ = RichTicketPanel::new(&ticket, &theme).build_text();
    }

    #[test]
    fn test_kpi_text_for_empty_report() {
        let theme = Theme::new();
        let _ = build_kpi_text(&KpiReport::default(), &theme);
    }

    #[test]
    fn test_kpi_text_with_data() {
        let theme = Theme::new();
        let report = KpiReport::compute(&[make_ticket(1, "Printer jam")], Utc::now());
        let _ = build_kpi_text(&report, &theme);
    }
}
