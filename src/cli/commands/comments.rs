//! Comments command implementation.

use crate::cli::{CommentAddArgs, CommentCommands, CommentsArgs};
use crate::config::{self, Settings};
use crate::error::{Result, TicketError};
use crate::format::{OutputContext, OutputMode, format_comment_block};
use crate::storage::SqliteStorage;
use crate::validation::TicketValidator;
use std::fs;
use tracing::info;

/// Execute the comments command.
///
/// # Errors
///
/// Returns `TicketNotFound`, a validation error, or a storage error.
pub fn execute(args: &CommentsArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    match &args.command {
        Some(CommentCommands::Add(add_args)) => {
            let mut workspace = config::open_storage_with_cli(cli)?;
            add_comment(add_args, &mut workspace.storage, &workspace.settings, ctx)
        }
        Some(CommentCommands::List(list_args)) => {
            let workspace = config::open_storage_with_cli(cli)?;
            list_comments(list_args.id, &workspace.storage, ctx)
        }
        None => {
            let id = args
                .id
                .ok_or_else(|| TicketError::validation("id", "missing ticket id"))?;
            let workspace = config::open_storage_with_cli(cli)?;
            list_comments(id, &workspace.storage, ctx)
        }
    }
}

fn add_comment(
    args: &CommentAddArgs,
    storage: &mut SqliteStorage,
    settings: &Settings,
    ctx: &OutputContext,
) -> Result<()> {
    let text = read_comment_text(args)?;
    let author = resolve_author(args.author.as_deref(), settings);
    TicketValidator::validate_comment(&author, &text)?;

    let comment = storage.add_comment(args.id, &author, &text)?;
    info!(ticket_id = args.id, comment_id = comment.id, %author, "Added comment");

    if ctx.is_json() {
        return ctx.json_pretty(&comment);
    }
    ctx.message(&format!("Comment added to #{}", args.id));
    Ok(())
}

fn list_comments(id: i64, storage: &SqliteStorage, ctx: &OutputContext) -> Result<()> {
    if !storage.ticket_exists(id)? {
        return Err(TicketError::TicketNotFound { id });
    }
    let comments = storage.get_comments(id)?;

    match ctx.mode() {
        OutputMode::Json => ctx.json_pretty(&comments)?,
        OutputMode::Quiet => {}
        OutputMode::Rich | OutputMode::Plain => {
            if comments.is_empty() {
                println!("No comments for #{id}.");
                return Ok(());
            }
            println!("Comments for #{id}:");
            for comment in &comments {
                println!("{}", format_comment_block(comment));
                println!();
            }
        }
    }

    Ok(())
}

fn read_comment_text(args: &CommentAddArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return Ok(fs::read_to_string(path)?);
    }
    if !args.text.is_empty() {
        return Ok(args.text.join(" "));
    }
    Err(TicketError::validation("content", "comment text required"))
}

fn resolve_author(author_override: Option<&str>, settings: &Settings) -> String {
    match author_override {
        Some(author) if !author.trim().is_empty() => author.trim().to_string(),
        _ => settings.default_author.clone(),
    }
}
