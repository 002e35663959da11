use ticket_desk::model::{NewAttachment, NewTicket, Priority, Status};

/// Builder for `NewTicket` with sensible defaults.
pub struct TicketBuilder {
    ticket: NewTicket,
}

impl TicketBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            ticket: NewTicket {
                title: title.to_string(),
                description: format!("Description of {title}"),
                priority: Priority::Medium,
                assignee: "alice".to_string(),
                category: None,
                status: None,
            },
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.ticket.priority = priority;
        self
    }

    pub fn assignee(mut self, assignee: &str) -> Self {
        self.ticket.assignee = assignee.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.ticket.category = Some(category.to_string());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.ticket.status = Some(status);
        self
    }

    pub fn build(self) -> NewTicket {
        self.ticket
    }
}

pub fn printer_jam() -> NewTicket {
    TicketBuilder::new("Printer jam")
        .assignee("alice")
        .priority(Priority::Low)
        .category("hardware")
        .build()
}

pub fn attachment(filename: &str, size_bytes: Option<i64>) -> NewAttachment {
    NewAttachment {
        filename: filename.to_string(),
        content_type: Some("text/plain".to_string()),
        size_bytes,
        path: format!("/uploads/{filename}"),
    }
}
