//! Attach command implementation.

use crate::cli::AttachArgs;
use crate::config::{self, ConfigPaths};
use crate::error::{Result, TicketError};
use crate::format::OutputContext;
use crate::model::Attachment;
use crate::storage::SqliteStorage;
use crate::util::uploads::store_upload;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Execute the attach command.
///
/// # Errors
///
/// Returns `TicketNotFound`, `UploadSourceMissing`, or an IO/storage error.
pub fn execute(args: &AttachArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let mut workspace = config::open_storage_with_cli(cli)?;
    attach_files(&mut workspace.storage, &workspace.paths, args.id, &args.files)?;

    let ticket = workspace
        .storage
        .get_ticket(args.id)?
        .ok_or(TicketError::TicketNotFound { id: args.id })?;
    super::show::print_ticket(&ticket, ctx)
}

/// Copy each file into the uploads directory and record it on the ticket.
///
/// The ticket is checked before any bytes are copied. If recording fails
/// after the copy, the stored file is removed again.
///
/// # Errors
///
/// Returns `TicketNotFound`, `UploadSourceMissing`, or an IO/storage error.
pub fn attach_files(
    storage: &mut SqliteStorage,
    paths: &ConfigPaths,
    ticket_id: i64,
    files: &[PathBuf],
) -> Result<Vec<Attachment>> {
    if !storage.ticket_exists(ticket_id)? {
        return Err(TicketError::TicketNotFound { id: ticket_id });
    }

    let mut attachments = Vec::with_capacity(files.len());
    for file in files {
        let stored = store_upload(&paths.uploads_dir, ticket_id, file, Utc::now())?;
        match storage.add_attachment(ticket_id, &stored.attachment) {
            Ok(attachment) => {
                info!(
                    ticket_id,
                    attachment_id = attachment.id,
                    filename = %attachment.filename,
                    "Attached file"
                );
                attachments.push(attachment);
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&stored.disk_path) {
                    warn!(path = %stored.disk_path.display(), %cleanup, "Failed to remove orphaned upload");
                }
                return Err(err);
            }
        }
    }

    Ok(attachments)
}
