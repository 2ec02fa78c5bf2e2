//! Handler for the `init` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::db::Db;

/// Initializes the rental store.
///
/// # Errors
/// Returns error if database initialization fails.
pub fn handle() -> Result<()> {
    Db::init()?;
    println!("{} Initialized .rentdesk/rentals.db", "✓".green());
    Ok(())
}
