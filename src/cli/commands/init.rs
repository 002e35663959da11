//! Init command implementation.

use crate::config::{self, ConfigPaths, Metadata, TICKETS_DIR_NAME};
use crate::error::Result;
use crate::format::OutputContext;
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::env;
use std::fs;
use tracing::info;

#[derive(Debug, Serialize)]
struct InitOutput {
    tickets_dir: String,
    database: String,
    uploads_dir: String,
    created: bool,
}

/// Create `.tickets/` in the current directory. Running it twice is harmless.
///
/// # Errors
///
/// Returns an error if the directory, metadata or database cannot be created.
pub fn execute(cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let tickets_dir = env::current_dir()?.join(TICKETS_DIR_NAME);
    let created = !tickets_dir.is_dir();
    fs::create_dir_all(&tickets_dir)?;

    if !tickets_dir.join("metadata.json").exists() {
        Metadata::default().save(&tickets_dir)?;
    }

    let layer = config::load_config(&tickets_dir, cli)?;
    let paths = ConfigPaths::resolve(&tickets_dir, &layer)?;
    fs::create_dir_all(&paths.uploads_dir)?;
    SqliteStorage::open(&paths.db_path)?;

    info!(dir = %tickets_dir.display(), created, "Initialized ticket workspace");

    if ctx.is_json() {
        return ctx.json_pretty(&InitOutput {
            tickets_dir: tickets_dir.display().to_string(),
            database: paths.db_path.display().to_string(),
            uploads_dir: paths.uploads_dir.display().to_string(),
            created,
        });
    }

    if created {
        ctx.message(&format!(
            "Initialized ticket workspace in {}",
            tickets_dir.display()
        ));
    } else {
        ctx.message(&format!(
            "Ticket workspace already exists in {}",
            tickets_dir.display()
        ));
    }
    Ok(())
}
