//! Presentation helpers: ordering, badges, and aggregate counts.
//!
//! Nothing here decides anything; these are the pure lookup tables and sort
//! orders the CLI (and any future dashboard) renders from.

use super::types::{Rental, RentalStatus};
use serde::Serialize;

/// Fixed display priority: active work first, closed records last.
#[must_use]
pub fn status_priority(status: RentalStatus) -> u8 {
    match status {
        RentalStatus::Scheduled => 0,
        RentalStatus::Rented => 1,
        RentalStatus::Completed => 2,
        RentalStatus::Cancelled => 3,
        RentalStatus::Refunded => 4,
    }
}

/// Stable sort by status priority, ties broken by ascending start date.
/// Rentals without a start date sort after dated ones of the same status.
pub fn sort_by_status_and_time(rentals: &mut [Rental]) {
    rentals.sort_by(|a, b| {
        status_priority(a.status)
            .cmp(&status_priority(b.status))
            .then_with(|| match (a.start_date, b.start_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
}

/// Label/color pair for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: &'static str,
}

/// Per-status badge lookup.
#[must_use]
pub fn status_badge(status: RentalStatus) -> StatusBadge {
    match status {
        RentalStatus::Scheduled => StatusBadge {
            label: "Scheduled",
            color: "blue",
        },
        RentalStatus::Rented => StatusBadge {
            label: "Rented",
            color: "green",
        },
        RentalStatus::Completed => StatusBadge {
            label: "Completed",
            color: "gray",
        },
        RentalStatus::Cancelled => StatusBadge {
            label: "Cancelled",
            color: "red",
        },
        RentalStatus::Refunded => StatusBadge {
            label: "Refunded",
            color: "amber",
        },
    }
}

/// Per-snapshot badge: the status badge plus a hand-over subtitle for
/// active rentals.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeConfig {
    pub label: &'static str,
    pub color: &'static str,
    pub subtitle: Option<String>,
}

#[must_use]
pub fn status_badge_config(rental: &Rental) -> BadgeConfig {
    let badge = status_badge(rental.status);
    let subtitle = match (rental.status, rental.started_at) {
        (RentalStatus::Rented, Some(at)) => Some(format!("started {}", at.to_rfc3339())),
        _ => None,
    };
    BadgeConfig {
        label: badge.label,
        color: badge.color,
        subtitle,
    }
}

/// Aggregate counts of rentals by status.
#[derive(Debug, Default, Serialize)]
pub struct StatusCounts {
    pub scheduled: usize,
    pub rented: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub refunded: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally(rentals: &[Rental]) -> Self {
        let mut counts = Self::default();
        for rental in rentals {
            match rental.status {
                RentalStatus::Scheduled => counts.scheduled += 1,
                RentalStatus::Rented => counts.rented += 1,
                RentalStatus::Completed => counts.completed += 1,
                RentalStatus::Cancelled => counts.cancelled += 1,
                RentalStatus::Refunded => counts.refunded += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.scheduled + self.rented + self.completed + self.cancelled + self.refunded
    }
}
