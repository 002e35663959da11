//! Command implementations, one module per subcommand.

pub mod attach;
pub mod comments;
pub mod completions;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod report;
pub mod schema;
pub mod show;
pub mod update;
