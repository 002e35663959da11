//! Command-line interface for `tkt`.

pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Support ticket tracker.
#[derive(Parser, Debug)]
#[command(name = "tkt", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Database path (overrides metadata.json)
    #[arg(long, global = true, env = "TICKET_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .tickets workspace in the current directory
    Init,

    /// Create a ticket
    Create(CreateArgs),

    /// List tickets
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a ticket with its comments and attachments
    Show(ShowArgs),

    /// Update ticket fields
    Update(UpdateArgs),

    /// Delete a ticket and everything attached to it
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Add or list comments
    Comments(CommentsArgs),

    /// Attach files to a ticket
    Attach(AttachArgs),

    /// KPI report over all tickets
    Report,

    /// Print JSON Schemas for machine-readable output
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Ticket title
    pub title: String,

    /// Ticket description
    #[arg(short, long)]
    pub description: String,

    /// Person responsible for the ticket
    #[arg(short, long)]
    pub assignee: String,

    /// low, medium or high
    #[arg(short, long, default_value = "medium")]
    pub priority: String,

    /// Category (defaults to "other")
    #[arg(short, long)]
    pub category: Option<String>,

    /// Initial status (defaults to open)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Files to attach after creation
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    /// Only tickets created at or after this time
    #[arg(long, value_name = "TIMESTAMP")]
    pub from: Option<String>,

    /// Only tickets created at or before this time
    #[arg(long, value_name = "TIMESTAMP")]
    pub to: Option<String>,

    /// created_at, updated_at, priority, status or assignee
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// asc or desc
    #[arg(long)]
    pub order: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long, conflicts_with = "clear_category")]
    pub category: Option<String>,

    /// Remove the category
    #[arg(long)]
    pub clear_category: bool,

    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    pub id: i64,
}

#[derive(Args, Debug, Clone)]
#[command(args_conflicts_with_subcommands = true)]
pub struct CommentsArgs {
    #[command(subcommand)]
    pub command: Option<CommentCommands>,

    /// Ticket id (lists comments)
    pub id: Option<i64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CommentCommands {
    /// Add a comment
    Add(CommentAddArgs),
    /// List comments
    List(CommentListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommentAddArgs {
    pub id: i64,

    /// Comment text
    #[arg(required_unless_present = "file")]
    pub text: Vec<String>,

    /// Read comment text from a file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Override the comment author
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CommentListArgs {
    pub id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct AttachArgs {
    pub id: i64,

    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::All)]
    pub target: SchemaTarget,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    All,
    Ticket,
    Report,
    Error,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_update_with_clear_category() {
        let cli = Cli::parse_from(["tkt", "update", "4", "--clear-category", "--status", "closed"]);
        let Commands::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.id, 4);
        assert!(args.clear_category);
        assert_eq!(args.status.as_deref(), Some("closed"));
    }

    #[test]
    fn category_and_clear_category_conflict() {
        let result = Cli::try_parse_from([
            "tkt",
            "update",
            "4",
            "--category",
            "net",
            "--clear-category",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn comments_accepts_bare_id() {
        let cli = Cli::parse_from(["tkt", "comments", "9"]);
        let Commands::Comments(args) = cli.command else {
            panic!("expected comments");
        };
        assert_eq!(args.id, Some(9));
        assert!(args.command.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tkt", "list", "--json", "-vv", "--sort", "priority"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
