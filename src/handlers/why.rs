//! Handler for the `why` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::db::Db;
use rentdesk::engine::evaluate::evaluate_status;
use rentdesk::engine::policy::TransitionPolicy;
use rentdesk::engine::present::status_badge_config;
use rentdesk::engine::repo::{AuditRepo, RentalRepo};
use rentdesk::engine::types::Rental;

use super::list::styled_label;

/// Explains a rental's status, its legal actions, and its audit history.
///
/// # Errors
/// Returns error if rental resolution or DB query fails.
pub fn handle(rental_ref: &str) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let rental = repo.resolve(rental_ref)?;

    let clock = super::business_clock()?;
    let now = clock.now();
    let policy = TransitionPolicy::from_env();

    let badge = status_badge_config(&rental);
    println!(
        "{} [{}] {}",
        styled_label(badge.label, badge.color),
        rental.reference.cyan().bold(),
        rental.customer
    );
    if let Some(vehicle) = &rental.vehicle {
        println!("   Vehicle: {vehicle}");
    }
    if let Some(subtitle) = badge.subtitle {
        println!("   {}", subtitle.dimmed());
    }
    print_window(&rental);

    let eval = evaluate_status(&rental, now, false);
    if let Some(warning) = eval.warning {
        println!("   {} {}", "⚠".yellow(), warning.detail);
    } else if eval.status != rental.status {
        println!(
            "   {} evaluation recommends {} (run `rentdesk reconcile`)",
            "⟳".cyan(),
            eval.status.to_string().green()
        );
    }

    print_actions(&policy, &rental, now);
    println!();
    print_history(&conn, &rental)?;
    Ok(())
}

fn print_window(rental: &Rental) {
    match (rental.start_date, rental.end_date) {
        (Some(start), Some(end)) => {
            println!(
                "   Window:  {} → {}",
                start.to_rfc3339().dimmed(),
                end.to_rfc3339().dimmed()
            );
        }
        _ => println!("   Window:  {}", "(incomplete)".yellow()),
    }
    if let Some(reason) = &rental.cancellation_reason {
        println!("   Cancelled: \"{reason}\"");
    }
}

fn print_actions(policy: &TransitionPolicy, rental: &Rental, now: chrono::DateTime<chrono_tz::Tz>) {
    let actions = policy.available_actions(rental, now);
    if actions.is_empty() {
        println!("   Actions: {}", "none (closed rental)".dimmed());
        return;
    }
    let names: Vec<String> = actions.iter().map(ToString::to_string).collect();
    println!("   Actions: {}", names.join(", ").green());
}

fn print_history(conn: &rusqlite::Connection, rental: &Rental) -> Result<()> {
    let history = AuditRepo::new(conn).history_for(rental.id)?;
    println!("{}", "Audit Log:".dimmed().underline());
    if history.is_empty() {
        println!("   (No history)");
        return Ok(());
    }
    for record in history {
        println!(
            "   {}  {}  {} → {}  by {}",
            record.recorded_at.to_rfc3339().dimmed(),
            record.action.to_string().yellow(),
            record.old_status.to_string().dimmed(),
            record.new_status,
            record.actor
        );
    }
    Ok(())
}
