//! Handler for the `complete` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::audit::AuditSink;
use rentdesk::engine::db::Db;
use rentdesk::engine::policy::TransitionPolicy;
use rentdesk::engine::repo::{AuditRepo, RentalRepo};
use rentdesk::engine::transition;

/// Closes out an active rental: `rented` → `completed`.
///
/// # Errors
/// Returns the denial reason verbatim if the transition is illegal.
pub fn handle(rental_ref: &str, actor: &str, media: Option<u32>) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let rental = repo.resolve(rental_ref)?;

    let clock = super::business_clock()?;
    let policy = TransitionPolicy::from_env();
    let outcome = transition::complete(&rental, actor, media, &policy, clock.now())?;

    repo.apply(&outcome.rental)?;
    AuditRepo::new(&conn).record(&outcome.audit)?;

    println!(
        "{} Rental [{}] completed by {}",
        "✓".green(),
        outcome.rental.reference.yellow(),
        actor
    );
    if let Some(count) = media {
        println!("   {} return photo(s) recorded", count);
    }
    Ok(())
}
