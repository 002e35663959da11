//! `SQLite` storage implementation.

use crate::error::{Result, TicketError};
use crate::model::{Attachment, Comment, NewAttachment, NewTicket, Priority, Status, Ticket};
use crate::report::KpiReport;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, trace};

const TICKET_COLUMNS: &str = "id, title, description, priority, assignee, category, status,
                              created_at, updated_at, resolved_at";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, tracking side effects.
///
/// All timestamps written by one operation share `now`, so a freshly created
/// ticket has `created_at == updated_at`.
pub struct MutationContext {
    pub op_name: String,
    pub now: DateTime<Utc>,
    pub touched: BTreeSet<i64>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            now: Utc::now(),
            touched: BTreeSet::new(),
        }
    }

    /// Refresh `updated_at` on the ticket when the mutation commits.
    pub fn touch(&mut self, ticket_id: i64) {
        self.touched.insert(ticket_id);
    }

    #[must_use]
    pub fn now_str(&self) -> String {
        format_datetime(&self.now)
    }
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        apply_schema_logged(&conn, &path.display().to_string())?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema_logged(&conn, ":memory:")?;
        Ok(Self { conn })
    }

    /// Execute a mutation inside one IMMEDIATE transaction.
    ///
    /// Touched tickets get `updated_at = ctx.now` before commit. Any error
    /// drops the transaction, which rolls it back.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails (e.g. database error, missing ticket).
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        let now = ctx.now_str();
        for id in &ctx.touched {
            tx.execute(
                "UPDATE tickets SET updated_at = ? WHERE id = ?",
                rusqlite::params![now, id],
            )?;
        }

        tx.commit()?;
        debug!(op = %ctx.op_name, touched = ctx.touched.len(), "Mutation committed");
        Ok(result)
    }

    /// Create a new ticket.
    ///
    /// A blank category is stored as "other" and a missing status as open.
    /// `resolved_at` always starts out null.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_ticket(&mut self, new: &NewTicket) -> Result<Ticket> {
        let id = self.mutate("create_ticket", |tx, ctx| {
            let category = new
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(crate::model::DEFAULT_CATEGORY);
            let status = new.status.unwrap_or_default();
            let now = ctx.now_str();

            tx.execute(
                "INSERT INTO tickets (
                    title, description, priority, assignee, category, status,
                    created_at, updated_at, resolved_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)",
                rusqlite::params![
                    new.title,
                    new.description,
                    new.priority.as_str(),
                    new.assignee,
                    category,
                    status.as_str(),
                    now,
                    now,
                ],
            )?;

            Ok(tx.last_insert_rowid())
        })?;

        debug!(ticket_id = id, "Created ticket");
        self.get_ticket(id)?
            .ok_or(TicketError::TicketNotFound { id })
    }

    /// Get a ticket by ID, including comments and attachments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?");
        let ticket = self
            .conn
            .query_row(&sql, [id], ticket_from_row)
            .optional()?;

        match ticket {
            Some(mut ticket) => {
                self.load_children(&mut ticket)?;
                Ok(Some(ticket))
            }
            None => Ok(None),
        }
    }

    /// List tickets matching all given filters, in the requested order.
    ///
    /// The full matching set is returned with children loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(&self, filters: &ListFilters, sort: SortSpec) -> Result<Vec<Ticket>> {
        let mut tickets = self.query_tickets(filters, sort)?;
        for ticket in &mut tickets {
            self.load_children(ticket)?;
        }
        debug!(count = tickets.len(), ?sort, "Listed tickets");
        Ok(tickets)
    }

    /// Ticket rows without children, for aggregate reporting.
    fn query_tickets(&self, filters: &ListFilters, sort: SortSpec) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filters.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(priority) = filters.priority {
            sql.push_str(" AND priority = ?");
            params.push(Box::new(priority.as_str()));
        }

        if let Some(ref assignee) = filters.assignee {
            sql.push_str(" AND assignee = ?");
            params.push(Box::new(assignee.clone()));
        }

        if let Some(ref from) = filters.created_from {
            sql.push_str(" AND created_at >= ?");
            params.push(Box::new(format_datetime(from)));
        }

        if let Some(ref to) = filters.created_to {
            sql.push_str(" AND created_at <= ?");
            params.push(Box::new(format_datetime(to)));
        }

        let _ = write!(
            sql,
            " ORDER BY {} {}, id ASC",
            sort.column.order_expr(),
            sort.order.as_sql()
        );
        trace!(%sql, "Ticket query");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Apply a partial update.
    ///
    /// Only fields present in `update` change. When the resulting status is
    /// resolved or closed and `resolved_at` is still null, it is set to now;
    /// it is never cleared afterwards. `updated_at` is refreshed even when
    /// no field changes.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket doesn't exist, or a database error.
    pub fn update_ticket(&mut self, id: i64, update: &TicketUpdate) -> Result<Ticket> {
        self.mutate("update_ticket", |tx, ctx| {
            let current: Option<(String, Option<String>)> = tx
                .query_row(
                    "SELECT status, resolved_at FROM tickets WHERE id = ?",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((current_status, resolved_at)) = current else {
                return Err(TicketError::TicketNotFound { id });
            };
            if update.is_empty() {
                debug!(ticket_id = id, "Empty update, only touching updated_at");
            }

            let mut set_clauses: Vec<&str> = vec![];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

            let mut add_update = |clause: &'static str, val: Box<dyn rusqlite::ToSql>| {
                set_clauses.push(clause);
                params.push(val);
            };

            if let Some(ref title) = update.title {
                add_update("title = ?", Box::new(title.clone()));
            }
            if let Some(ref description) = update.description {
                add_update("description = ?", Box::new(description.clone()));
            }
            if let Some(priority) = update.priority {
                add_update("priority = ?", Box::new(priority.as_str()));
            }
            if let Some(ref assignee) = update.assignee {
                add_update("assignee = ?", Box::new(assignee.clone()));
            }
            if let Some(ref category) = update.category {
                add_update("category = ?", Box::new(category.clone()));
            }
            if let Some(status) = update.status {
                add_update("status = ?", Box::new(status.as_str()));
            }

            let resulting_status = match update.status {
                Some(status) => status,
                None => parse_status(&current_status),
            };
            if resulting_status.is_terminal() && resolved_at.is_none() {
                add_update("resolved_at = ?", Box::new(ctx.now_str()));
                debug!(ticket_id = id, status = %resulting_status, "Latching resolved_at");
            }

            if !set_clauses.is_empty() {
                let sql = format!("UPDATE tickets SET {} WHERE id = ?", set_clauses.join(", "));
                params.push(Box::new(id));
                let params_refs: Vec<&dyn rusqlite::ToSql> =
                    params.iter().map(AsRef::as_ref).collect();
                tx.execute(&sql, params_refs.as_slice())?;
            }

            ctx.touch(id);
            Ok(())
        })?;

        self.get_ticket(id)?
            .ok_or(TicketError::TicketNotFound { id })
    }

    /// Delete a ticket; comments and attachments go with it.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket doesn't exist, or a database error.
    pub fn delete_ticket(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_ticket", |tx, _ctx| {
            let rows = tx.execute("DELETE FROM tickets WHERE id = ?", [id])?;
            if rows == 0 {
                return Err(TicketError::TicketNotFound { id });
            }
            debug!(ticket_id = id, "Deleted ticket");
            Ok(())
        })
    }

    /// Add a comment to a ticket and refresh the ticket's `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket doesn't exist, or a database error.
    pub fn add_comment(&mut self, ticket_id: i64, author: &str, content: &str) -> Result<Comment> {
        self.mutate("add_comment", |tx, ctx| {
            ensure_ticket(tx, ticket_id)?;

            tx.execute(
                "INSERT INTO comments (ticket_id, author, content, created_at)
                 VALUES (?, ?, ?, ?)",
                rusqlite::params![ticket_id, author, content, ctx.now_str()],
            )?;
            let comment_id = tx.last_insert_rowid();

            ctx.touch(ticket_id);
            fetch_comment(tx, comment_id)
        })
    }

    /// Record an attachment and refresh the ticket's `updated_at`.
    ///
    /// The caller stores the file bytes first and passes the resulting path.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket doesn't exist, or a database error.
    pub fn add_attachment(&mut self, ticket_id: i64, new: &NewAttachment) -> Result<Attachment> {
        self.mutate("add_attachment", |tx, ctx| {
            ensure_ticket(tx, ticket_id)?;

            tx.execute(
                "INSERT INTO attachments (ticket_id, filename, content_type, size_bytes, path, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    ticket_id,
                    new.filename,
                    new.content_type,
                    new.size_bytes,
                    new.path,
                    ctx.now_str()
                ],
            )?;
            let attachment_id = tx.last_insert_rowid();

            ctx.touch(ticket_id);
            fetch_attachment(tx, attachment_id)
        })
    }

    /// Get comments for a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_comments(&self, ticket_id: i64) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, author, content, created_at
             FROM comments
             WHERE ticket_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let comments = stmt
            .query_map([ticket_id], comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Get attachments for a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_attachments(&self, ticket_id: i64) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, filename, content_type, size_bytes, path, created_at
             FROM attachments
             WHERE ticket_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let attachments = stmt
            .query_map([ticket_id], attachment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attachments)
    }

    /// Check if a ticket ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn ticket_exists(&self, id: i64) -> Result<bool> {
        let count: i64 =
            self.conn
                .query_row("SELECT count(*) FROM tickets WHERE id = ?", [id], |row| {
                    row.get(0)
                })?;
        Ok(count > 0)
    }

    /// Count all tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_tickets(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM tickets", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// KPI report over every ticket, evaluated now.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn kpi_report(&self) -> Result<KpiReport> {
        self.kpi_report_at(Utc::now())
    }

    /// KPI report over every ticket, evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn kpi_report_at(&self, now: DateTime<Utc>) -> Result<KpiReport> {
        let tickets = self.query_tickets(&ListFilters::default(), SortSpec::default())?;
        debug!(total = tickets.len(), "Loaded tickets for KPI report");
        Ok(KpiReport::compute(&tickets, now))
    }

    fn load_children(&self, ticket: &mut Ticket) -> Result<()> {
        ticket.comments = self.get_comments(ticket.id)?;
        ticket.attachments = self.get_attachments(ticket.id)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Filter options for listing tickets. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// Columns a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
    Assignee,
}

impl SortColumn {
    /// Parse a column name; anything unrecognised sorts by `created_at`.
    #[must_use]
    pub fn from_param(s: &str) -> Self {
        match s.trim() {
            "updated_at" => Self::UpdatedAt,
            "priority" => Self::Priority,
            "status" => Self::Status,
            "assignee" => Self::Assignee,
            _ => Self::CreatedAt,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::Assignee => "assignee",
        }
    }

    // Priority sorts by severity; status by its stored name.
    const fn order_expr(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Priority => "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END",
            Self::Status => "status",
            Self::Assignee => "assignee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// "desc" sorts descending; any other value sorts ascending.
    #[must_use]
    pub fn from_param(s: &str) -> Self {
        if s.trim() == "desc" { Self::Desc } else { Self::Asc }
    }

    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort column and direction for [`SqliteStorage::list_tickets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl SortSpec {
    /// Build from raw request strings; never fails.
    #[must_use]
    pub fn from_params(sort_by: &str, order: &str) -> Self {
        Self {
            column: SortColumn::from_param(sort_by),
            order: SortOrder::from_param(order),
        }
    }
}

/// Fields to update on a ticket. `None` leaves a field untouched.
///
/// `category` is nullable: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub category: Option<Option<String>>,
    pub status: Option<Status>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }
}

fn apply_schema_logged(conn: &Connection, target: &str) -> Result<()> {
    crate::storage::schema::apply_schema(conn)?;
    debug!(db = target, "Schema applied");
    Ok(())
}

fn ensure_ticket(tx: &Transaction<'_>, ticket_id: i64) -> Result<()> {
    let exists = tx
        .prepare("SELECT 1 FROM tickets WHERE id = ?")?
        .exists([ticket_id])?;
    if exists {
        Ok(())
    } else {
        Err(TicketError::TicketNotFound { id: ticket_id })
    }
}

fn parse_status(s: &str) -> Status {
    s.parse().unwrap_or_default()
}

fn parse_priority(s: &str) -> Priority {
    s.parse().unwrap_or_default()
}

/// Fixed-width RFC 3339 so string comparison in SQL is chronological.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Utc.from_utc_datetime(&naive);
    }

    Utc::now()
}

fn ticket_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_priority(&row.get::<_, String>(3)?),
        assignee: row.get(4)?,
        category: row.get(5)?,
        status: parse_status(&row.get::<_, String>(6)?),
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
        resolved_at: row
            .get::<_, Option<String>>(9)?
            .as_deref()
            .map(parse_datetime),
        attachments: vec![], // Loaded separately if needed
        comments: vec![],    // Loaded separately if needed
    })
}

fn comment_from_row(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        author: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn attachment_from_row(row: &rusqlite::Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        filename: row.get(2)?,
        content_type: row.get(3)?,
        size_bytes: row.get(4)?,
        path: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn fetch_comment(tx: &Transaction<'_>, comment_id: i64) -> Result<Comment> {
    tx.query_row(
        "SELECT id, ticket_id, author, content, created_at FROM comments WHERE id = ?",
        rusqlite::params![comment_id],
        comment_from_row,
    )
    .map_err(TicketError::from)
}

fn fetch_attachment(tx: &Transaction<'_>, attachment_id: i64) -> Result<Attachment> {
    tx.query_row(
        "SELECT id, ticket_id, filename, content_type, size_bytes, path, created_at
         FROM attachments WHERE id = ?",
        rusqlite::params![attachment_id],
        attachment_from_row,
    )
    .map_err(TicketError::from)
}
