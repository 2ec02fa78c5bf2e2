//! Handler for the `status` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::db::Db;
use rentdesk::engine::present::{sort_by_status_and_time, StatusCounts};
use rentdesk::engine::repo::RentalRepo;
use rentdesk::engine::types::{Rental, RentalStatus};
use serde::Serialize;

/// Displays fleet-wide rental status.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(json: bool) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let mut rentals = repo.get_all()?;
    sort_by_status_and_time(&mut rentals);
    let counts = StatusCounts::tally(&rentals);

    if json {
        return print_json(&rentals, counts);
    }
    print_human(&rentals, &counts);
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    counts: StatusCounts,
    active: Vec<RentalView>,
    upcoming: Vec<RentalView>,
}

#[derive(Serialize)]
struct RentalView {
    id: i64,
    reference: String,
    customer: String,
    start_date: Option<String>,
}

fn view(rental: &Rental) -> RentalView {
    RentalView {
        id: rental.id,
        reference: rental.reference.clone(),
        customer: rental.customer.clone(),
        start_date: rental.start_date.map(|d| d.to_rfc3339()),
    }
}

fn print_json(rentals: &[Rental], counts: StatusCounts) -> Result<()> {
    let report = StatusReport {
        counts,
        active: rentals
            .iter()
            .filter(|r| r.status == RentalStatus::Rented)
            .map(view)
            .collect(),
        upcoming: rentals
            .iter()
            .filter(|r| r.status == RentalStatus::Scheduled)
            .take(5)
            .map(view)
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_human(rentals: &[Rental], counts: &StatusCounts) {
    println!("{} Fleet Status", "📊".cyan());
    println!(
        "   {} scheduled, {} rented, {} completed, {} cancelled, {} refunded ({} total)",
        counts.scheduled.to_string().blue(),
        counts.rented.to_string().green(),
        counts.completed,
        counts.cancelled,
        counts.refunded,
        counts.total()
    );

    let out_now: Vec<_> = rentals
        .iter()
        .filter(|r| r.status == RentalStatus::Rented)
        .collect();
    if !out_now.is_empty() {
        println!("\n   Out now:");
        for rental in out_now {
            println!(
                "     - [{}] {}",
                rental.reference.green(),
                rental.customer
            );
        }
    }

    let upcoming: Vec<_> = rentals
        .iter()
        .filter(|r| r.status == RentalStatus::Scheduled)
        .take(3)
        .collect();
    if !upcoming.is_empty() {
        println!("\n   Next pickups:");
        for rental in upcoming {
            let when = rental
                .start_date
                .map_or_else(|| "(no date)".to_string(), |d| d.to_rfc3339());
            println!(
                "     - [{}] {}  {}",
                rental.reference.dimmed(),
                rental.customer,
                when.dimmed()
            );
        }
    }
}
