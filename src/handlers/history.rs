//! Handler for the `history` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::audit::AuditRecord;
use rentdesk::engine::db::Db;
use rentdesk::engine::repo::{AuditRepo, RentalRepo};

/// Displays the audit trail, globally or for one rental.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(limit: usize, rental_ref: Option<&str>) -> Result<()> {
    let conn = Db::connect()?;
    let audit = AuditRepo::new(&conn);

    let history: Vec<(String, AuditRecord)> = match rental_ref {
        Some(query) => {
            let rental = RentalRepo::new(&conn).resolve(query)?;
            audit
                .history_for(rental.id)?
                .into_iter()
                .take(limit)
                .map(|record| (rental.reference.clone(), record))
                .collect()
        }
        None => audit.global_history(limit)?,
    };

    println!("{} Audit Trail (last {})", "📜".cyan(), limit);
    println!();

    if history.is_empty() {
        println!("   (No history recorded yet)");
        return Ok(());
    }

    for (reference, record) in history {
        let action = match record.action.as_str() {
            "started" => "STARTED   ".green(),
            "completed" => "COMPLETED ".dimmed(),
            "cancelled" => "CANCELLED ".red(),
            _ => "RECONCILED".cyan(),
        };
        let reason = record
            .reason
            .map_or_else(String::new, |r| format!("  \"{r}\""));
        println!(
            "   {}  {}  {}  {} → {}  by {}{}",
            record.recorded_at.to_rfc3339().dimmed(),
            action,
            reference.bold(),
            record.old_status.to_string().dimmed(),
            record.new_status,
            record.actor,
            reason.dimmed()
        );
    }

    Ok(())
}
