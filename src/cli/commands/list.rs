//! List command implementation.

use crate::cli::ListArgs;
use crate::config::{self, Settings};
use crate::error::Result;
use crate::format::{OutputContext, OutputMode, format_ticket_line, rich};
use crate::model::{Priority, Status};
use crate::storage::ListFilters;
use crate::util::time::parse_timestamp;
use tracing::{debug, info};

/// Execute the list command.
///
/// # Errors
///
/// Returns a validation error for bad filter values, or a storage error.
pub fn execute(args: &ListArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let filters = build_filters(args)?;
    let workspace = config::open_storage_with_cli(cli)?;
    let sort = sort_for(args, &workspace.settings);
    debug!(?filters, ?sort, "Listing tickets");

    let tickets = workspace.storage.list_tickets(&filters, sort)?;
    info!(count = tickets.len(), "Listed tickets");

    match ctx.mode() {
        OutputMode::Json => ctx.json_pretty(&tickets)?,
        OutputMode::Quiet => {}
        _ if tickets.is_empty() => println!("No tickets found."),
        OutputMode::Rich => rich::render_ticket_table(&tickets, ctx),
        OutputMode::Plain => {
            let title_width = ctx.width().saturating_sub(40).max(20);
            for ticket in &tickets {
                println!("{}", format_ticket_line(ticket, Some(title_width)));
            }
        }
    }

    Ok(())
}

fn build_filters(args: &ListArgs) -> Result<ListFilters> {
    Ok(ListFilters {
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
        priority: args
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        assignee: args.assignee.clone(),
        created_from: args
            .from
            .as_deref()
            .map(|s| parse_timestamp("from", s))
            .transpose()?,
        created_to: args
            .to
            .as_deref()
            .map(|s| parse_timestamp("to", s))
            .transpose()?,
    })
}

fn sort_for(args: &ListArgs, settings: &Settings) -> crate::storage::SortSpec {
    settings.sort_spec(args.sort.as_deref(), args.order.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SortColumn, SortOrder};

    #[test]
    fn filters_parse_all_fields() {
        let filters = build_filters(&ListArgs {
            status: Some("open".to_string()),
            priority: Some("low".to_string()),
            assignee: Some("alice".to_string()),
            from: Some("2024-01-01".to_string()),
            to: Some("2024-01-31T23:59:59Z".to_string()),
            ..ListArgs::default()
        })
        .unwrap();
        assert_eq!(filters.status, Some(Status::Open));
        assert_eq!(filters.priority, Some(Priority::Low));
        assert_eq!(filters.assignee.as_deref(), Some("alice"));
        assert!(filters.created_from.unwrap() < filters.created_to.unwrap());
    }

    #[test]
    fn bad_timestamp_is_a_validation_error() {
        let err = build_filters(&ListArgs {
            from: Some("last tuesday".to_string()),
            ..ListArgs::default()
        })
        .unwrap_err();
        assert_eq!(err.code().exit_code(), 2);
    }

    #[test]
    fn unknown_sort_column_falls_back() {
        let args = ListArgs {
            sort: Some("bogus".to_string()),
            order: Some("sideways".to_string()),
            ..ListArgs::default()
        };
        let sort = sort_for(&args, &Settings::default());
        assert_eq!(sort.column, SortColumn::CreatedAt);
        assert_eq!(sort.order, SortOrder::Asc);
    }
}
