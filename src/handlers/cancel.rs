//! Handler for the `cancel` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::audit::AuditSink;
use rentdesk::engine::db::Db;
use rentdesk::engine::policy::TransitionPolicy;
use rentdesk::engine::repo::{AuditRepo, RentalRepo};
use rentdesk::engine::transition;

/// Cancels a scheduled or active rental.
///
/// # Errors
/// Returns the denial reason verbatim if the transition is illegal.
pub fn handle(rental_ref: &str, actor: &str, reason: &str) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let rental = repo.resolve(rental_ref)?;

    let clock = super::business_clock()?;
    let policy = TransitionPolicy::from_env();
    let outcome = transition::cancel(&rental, actor, reason, &policy, clock.now())?;

    repo.apply(&outcome.rental)?;
    AuditRepo::new(&conn).record(&outcome.audit)?;

    println!(
        "{} Rental [{}] cancelled: {}",
        "✗".red(),
        outcome.rental.reference.yellow(),
        reason
    );
    Ok(())
}
