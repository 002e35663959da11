//! Request-layer validation.
//!
//! Storage trusts its inputs; commands run these checks before calling it.

use crate::error::{Result, TicketError};
use crate::model::NewTicket;
use crate::storage::TicketUpdate;

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_ASSIGNEE_LEN: usize = 120;
pub const MAX_CATEGORY_LEN: usize = 80;
pub const MAX_AUTHOR_LEN: usize = 120;
pub const MAX_FILENAME_LEN: usize = 255;

/// Validates ticket, comment and attachment input.
pub struct TicketValidator;

impl TicketValidator {
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate_new(ticket: &NewTicket) -> Result<()> {
        validate_title(&ticket.title)?;
        require_non_empty("description", &ticket.description)?;
        validate_assignee(&ticket.assignee)?;
        if let Some(category) = &ticket.category {
            validate_max_len("category", category, MAX_CATEGORY_LEN)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate_update(update: &TicketUpdate) -> Result<()> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(description) = &update.description {
            require_non_empty("description", description)?;
        }
        if let Some(assignee) = &update.assignee {
            validate_assignee(assignee)?;
        }
        if let Some(Some(category)) = &update.category {
            validate_max_len("category", category, MAX_CATEGORY_LEN)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a validation error if content is blank or the author too long.
    pub fn validate_comment(author: &str, content: &str) -> Result<()> {
        require_non_empty("author", author)?;
        validate_max_len("author", author, MAX_AUTHOR_LEN)?;
        require_non_empty("content", content)
    }

    /// # Errors
    ///
    /// Returns a validation error for blank or overlong file names.
    pub fn validate_filename(filename: &str) -> Result<()> {
        require_non_empty("filename", filename)?;
        validate_max_len("filename", filename, MAX_FILENAME_LEN)
    }
}

fn validate_title(title: &str) -> Result<()> {
    require_non_empty("title", title)?;
    validate_max_len("title", title, MAX_TITLE_LEN)
}

fn validate_assignee(assignee: &str) -> Result<()> {
    require_non_empty("assignee", assignee)?;
    validate_max_len("assignee", assignee, MAX_ASSIGNEE_LEN)
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TicketError::validation(field, "cannot be empty"));
    }
    Ok(())
}

fn validate_max_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(TicketError::validation(
            field,
            format!("exceeds {max} characters (got {len})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn valid_ticket() -> NewTicket {
        NewTicket {
            title: "Printer jam".to_string(),
            description: "Tray 2 is stuck".to_string(),
            priority: Priority::Low,
            assignee: "alice".to_string(),
            category: Some("hardware".to_string()),
            status: None,
        }
    }

    #[test]
    fn accepts_valid_ticket() {
        assert!(TicketValidator::validate_new(&valid_ticket()).is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        let mut ticket = valid_ticket();
        ticket.title = "   ".to_string();
        let err = TicketValidator::validate_new(&ticket).unwrap_err();
        assert!(matches!(err, TicketError::Validation { ref field, .. } if field == "title"));
    }

    #[test]
    fn title_limit_counts_characters() {
        let mut ticket = valid_ticket();
        ticket.title = "é".repeat(MAX_TITLE_LEN);
        assert!(TicketValidator::validate_new(&ticket).is_ok());
        ticket.title.push('x');
        assert!(TicketValidator::validate_new(&ticket).is_err());
    }

    #[test]
    fn rejects_long_assignee_and_category() {
        let mut ticket = valid_ticket();
        ticket.assignee = "a".repeat(MAX_ASSIGNEE_LEN + 1);
        assert!(TicketValidator::validate_new(&ticket).is_err());

        let mut ticket = valid_ticket();
        ticket.category = Some("c".repeat(MAX_CATEGORY_LEN + 1));
        assert!(TicketValidator::validate_new(&ticket).is_err());
    }

    #[test]
    fn update_skips_absent_fields() {
        assert!(TicketValidator::validate_update(&TicketUpdate::default()).is_ok());
        let clear = TicketUpdate {
            category: Some(None),
            ..TicketUpdate::default()
        };
        assert!(TicketValidator::validate_update(&clear).is_ok());
        let blank_title = TicketUpdate {
            title: Some(String::new()),
            ..TicketUpdate::default()
        };
        assert!(TicketValidator::validate_update(&blank_title).is_err());
    }

    #[test]
    fn comment_requires_content() {
        assert!(TicketValidator::validate_comment("bob", "looking into it").is_ok());
        assert!(TicketValidator::validate_comment("bob", " \n").is_err());
        assert!(TicketValidator::validate_comment("", "text").is_err());
    }
}
