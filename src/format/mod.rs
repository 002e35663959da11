//! Output formatting for `ticket_desk`.
//!
//! Supports rich terminal output, plain text, and machine-parseable JSON.
//! JSON mode sends clean JSON to stdout with diagnostics to stderr.

mod context;
pub mod rich;
mod text;
mod theme;

pub use context::{OutputContext, OutputMode};
pub use text::{
    format_comment_block, format_priority_label, format_status_icon, format_ticket_line,
    format_timestamp, terminal_width, truncate_title,
};
pub use theme::Theme;
