//! Handler for the `add` command.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use rentdesk::engine::db::Db;
use rentdesk::engine::repo::{reference_from, NewRental, RentalRepo};
use rentdesk::engine::types::PaymentStatus;

/// Books a new rental. Snapshots are born `scheduled`.
///
/// # Errors
/// Returns error if the reference exists or a date cannot be parsed.
pub fn handle(
    customer: &str,
    start: &str,
    end: &str,
    vehicle: Option<&str>,
    reference: Option<&str>,
    payment: Option<&str>,
) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);

    let start_date = parse_date(start).context("Invalid --start date")?;
    let end_date = parse_date(end).context("Invalid --end date")?;
    if end_date <= start_date {
        bail!("Rental window is empty: end must be after start");
    }

    let reference = reference.map_or_else(
        || reference_from(customer, Some(start_date)),
        ToString::to_string,
    );
    if repo.find_by_reference(&reference)?.is_some() {
        bail!("Rental with reference '{reference}' already exists");
    }

    let id = repo.add(&NewRental {
        reference: reference.clone(),
        customer: customer.to_string(),
        vehicle: vehicle.map(ToString::to_string),
        start_date: Some(start_date),
        end_date: Some(end_date),
        payment_status: payment.map_or(PaymentStatus::Pending, |p| {
            PaymentStatus::from(p.to_string())
        }),
    })?;

    println!(
        "{} Booked rental #{} [{}] for {}",
        "✓".green(),
        id,
        reference.yellow(),
        customer
    );
    println!(
        "   window: {} → {}",
        start_date.to_rfc3339().dimmed(),
        end_date.to_rfc3339().dimmed()
    );
    Ok(())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
