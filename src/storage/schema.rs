//! Database schema definitions and migration logic.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the ticket database.
pub const SCHEMA_SQL: &str = r"
    -- Tickets table
    CREATE TABLE IF NOT EXISTS tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        priority TEXT NOT NULL DEFAULT 'medium'
            CHECK(priority IN ('low', 'medium', 'high')),
        assignee TEXT NOT NULL,
        category TEXT DEFAULT 'other',
        status TEXT NOT NULL DEFAULT 'open'
            CHECK(status IN ('open', 'in-progress', 'resolved', 'closed')),
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL,
        resolved_at DATETIME
    );

    CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
    CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
    CREATE INDEX IF NOT EXISTS idx_tickets_assignee ON tickets(assignee);
    CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);
    CREATE INDEX IF NOT EXISTS idx_tickets_updated_at ON tickets(updated_at);

    -- Comments (append-only)
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id INTEGER NOT NULL,
        author TEXT NOT NULL DEFAULT 'User',
        content TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id);

    -- Attachments (file bytes live in the uploads directory)
    CREATE TABLE IF NOT EXISTS attachments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id INTEGER NOT NULL,
        filename TEXT NOT NULL,
        content_type TEXT,
        size_bytes INTEGER,
        path TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_attachments_ticket ON attachments(ticket_id);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    run_migrations(conn)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Required for ON DELETE CASCADE; SQLite leaves it off per connection.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")
        .and_then(|mut stmt| stmt.exists([table]))
        .unwrap_or(false)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    // pragma_table_info() needs the table name inline; callers pass known table names only.
    let sql = format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?");
    conn.prepare(&sql)
        .and_then(|mut stmt| stmt.exists([column]))
        .unwrap_or(false)
}

const TICKET_COLUMNS: &[(&str, &str)] = &[
    ("category", "TEXT DEFAULT 'other'"),
    ("resolved_at", "DATETIME"),
];

const ATTACHMENT_COLUMNS: &[(&str, &str)] = &[
    ("content_type", "TEXT"),
    ("size_bytes", "INTEGER"),
];

const COMMENT_COLUMNS: &[(&str, &str)] = &[("author", "TEXT NOT NULL DEFAULT 'User'")];

fn ensure_columns(conn: &Connection, table: &str, columns: &[(&str, &str)]) -> Result<()> {
    if !table_exists(conn, table) {
        return Ok(());
    }

    for (name, definition) in columns {
        if !column_exists(conn, table, name) {
            let sql = format!("ALTER TABLE {table} ADD COLUMN {name} {definition}");
            conn.execute(&sql, [])?;
        }
    }

    Ok(())
}

/// Back-fill columns added after a database was first created.
fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version >= CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    ensure_columns(conn, "tickets", TICKET_COLUMNS)?;
    ensure_columns(conn, "attachments", ATTACHMENT_COLUMNS)?;
    ensure_columns(conn, "comments", COMMENT_COLUMNS)?;

    Ok(())
}
