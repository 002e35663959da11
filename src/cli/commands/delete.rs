//! Delete command implementation.

use crate::cli::DeleteArgs;
use crate::config;
use crate::error::Result;
use crate::format::OutputContext;
use serde_json::json;
use tracing::info;

/// Execute the delete command. Comments and attachment records go with the ticket.
///
/// # Errors
///
/// Returns `TicketNotFound` if the id does not exist, or a storage error.
pub fn execute(args: &DeleteArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let mut workspace = config::open_storage_with_cli(cli)?;
    workspace.storage.delete_ticket(args.id)?;
    info!(ticket_id = args.id, "Deleted ticket");

    if ctx.is_json() {
        return ctx.json_pretty(&json!({ "deleted": args.id }));
    }
    ctx.message(&format!("Deleted ticket #{}", args.id));
    Ok(())
}
