//! Update command implementation.

use crate::cli::UpdateArgs;
use crate::config;
use crate::error::Result;
use crate::format::OutputContext;
use crate::model::{Priority, Status};
use crate::storage::TicketUpdate;
use crate::validation::TicketValidator;
use tracing::info;

/// Execute the update command.
///
/// Even with no field flags the ticket's `updated_at` is refreshed.
///
/// # Errors
///
/// Returns a validation error, `TicketNotFound`, or a storage error.
pub fn execute(args: &UpdateArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let update = build_update(args)?;
    TicketValidator::validate_update(&update)?;

    let mut workspace = config::open_storage_with_cli(cli)?;
    let ticket = workspace.storage.update_ticket(args.id, &update)?;
    info!(ticket_id = ticket.id, status = %ticket.status, "Updated ticket");

    super::show::print_ticket(&ticket, ctx)
}

fn build_update(args: &UpdateArgs) -> Result<TicketUpdate> {
    let category = if args.clear_category {
        Some(None)
    } else {
        args.category.clone().map(Some)
    };

    Ok(TicketUpdate {
        title: args.title.as_deref().map(|t| t.trim().to_string()),
        description: args.description.clone(),
        priority: args
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        assignee: args.assignee.as_deref().map(|a| a.trim().to_string()),
        category,
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
    })
}
