//! Create command implementation.

use crate::cli::CreateArgs;
use crate::config;
use crate::error::{Result, TicketError};
use crate::format::OutputContext;
use crate::model::{NewTicket, Priority, Status};
use crate::validation::TicketValidator;
use tracing::info;

/// Execute the create command.
///
/// # Errors
///
/// Returns a validation error for bad input, or a storage/upload error.
pub fn execute(args: &CreateArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let new = build_new_ticket(args)?;
    TicketValidator::validate_new(&new)?;

    let mut workspace = config::open_storage_with_cli(cli)?;
    let mut ticket = workspace.storage.create_ticket(&new)?;
    info!(ticket_id = ticket.id, title = %ticket.title, "Created ticket");

    if !args.files.is_empty() {
        super::attach::attach_files(
            &mut workspace.storage,
            &workspace.paths,
            ticket.id,
            &args.files,
        )?;
        ticket = workspace
            .storage
            .get_ticket(ticket.id)?
            .ok_or(TicketError::TicketNotFound { id: ticket.id })?;
    }

    super::show::print_ticket(&ticket, ctx)
}

fn build_new_ticket(args: &CreateArgs) -> Result<NewTicket> {
    let priority: Priority = args.priority.parse()?;
    let status = args
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()?;

    Ok(NewTicket {
        title: args.title.trim().to_string(),
        description: args.description.clone(),
        priority,
        assignee: args.assignee.trim().to_string(),
        category: args.category.clone(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CreateArgs {
        CreateArgs {
            title: "  Printer jam ".to_string(),
            description: "Tray 2".to_string(),
            assignee: "alice".to_string(),
            priority: "HIGH".to_string(),
            ..CreateArgs::default()
        }
    }

    #[test]
    fn parses_enums_case_insensitively() {
        let new = build_new_ticket(&CreateArgs {
            status: Some("in_progress".to_string()),
            ..args()
        })
        .unwrap();
        assert_eq!(new.title, "Printer jam");
        assert_eq!(new.priority, Priority::High);
        assert_eq!(new.status, Some(Status::InProgress));
    }

    #[test]
    fn rejects_unknown_priority() {
        let err = build_new_ticket(&CreateArgs {
            priority: "urgent".to_string(),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.code().exit_code(), 2);
    }
}
