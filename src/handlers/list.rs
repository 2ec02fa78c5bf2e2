//! Handler for the `list` command.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::db::Db;
use rentdesk::engine::present::{sort_by_status_and_time, status_badge_config};
use rentdesk::engine::repo::RentalRepo;
use rentdesk::engine::types::Rental;
use serde::Serialize;

/// Lists all rentals in presentation order.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(json: bool) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let mut rentals = repo.get_all()?;
    sort_by_status_and_time(&mut rentals);

    if json {
        return print_json(&rentals);
    }
    print_human(&rentals);
    Ok(())
}

#[derive(Serialize)]
struct RentalView {
    id: i64,
    reference: String,
    customer: String,
    status: String,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn print_json(rentals: &[Rental]) -> Result<()> {
    let views: Vec<RentalView> = rentals
        .iter()
        .map(|r| RentalView {
            id: r.id,
            reference: r.reference.clone(),
            customer: r.customer.clone(),
            status: r.status.to_string(),
            start_date: r.start_date.map(|d| d.to_rfc3339()),
            end_date: r.end_date.map(|d| d.to_rfc3339()),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

fn print_human(rentals: &[Rental]) {
    if rentals.is_empty() {
        println!("   (No rentals booked yet)");
        return;
    }

    for rental in rentals {
        let badge = status_badge_config(rental);
        let window = match (rental.start_date, rental.end_date) {
            (Some(s), Some(e)) => format!("{} → {}", s.to_rfc3339(), e.to_rfc3339()),
            _ => "(incomplete window)".to_string(),
        };
        println!(
            "   [{}] {}  {}  {}",
            rental.reference.yellow(),
            styled_label(badge.label, badge.color),
            rental.customer,
            window.dimmed()
        );
        if let Some(subtitle) = badge.subtitle {
            println!("       {}", subtitle.dimmed());
        }
    }
}

pub(crate) fn styled_label(label: &str, color: &str) -> colored::ColoredString {
    match color {
        "green" => label.green(),
        "blue" => label.blue(),
        "red" => label.red(),
        "amber" => label.yellow(),
        _ => label.dimmed(),
    }
}
