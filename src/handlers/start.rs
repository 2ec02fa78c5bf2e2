//! Handler for the `start` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::audit::AuditSink;
use rentdesk::engine::db::Db;
use rentdesk::engine::policy::TransitionPolicy;
use rentdesk::engine::repo::{AuditRepo, RentalRepo};
use rentdesk::engine::transition;

/// Hands a vehicle over: `scheduled` → `rented`.
///
/// # Errors
/// Returns the denial reason verbatim if the transition is illegal.
pub fn handle(rental_ref: &str, actor: &str) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let rental = repo.resolve(rental_ref)?;

    let clock = super::business_clock()?;
    let policy = TransitionPolicy::from_env();
    let outcome = transition::start(&rental, actor, &policy, clock.now())?;

    repo.apply(&outcome.rental)?;
    AuditRepo::new(&conn).record(&outcome.audit)?;

    println!(
        "{} Rental [{}] is now {} (handed over by {})",
        "✓".green(),
        outcome.rental.reference.yellow(),
        "rented".green(),
        actor
    );
    Ok(())
}
