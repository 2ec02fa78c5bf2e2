//! Core types for the rentdesk system.
//!
//! Note: the stored `status` column is a cache of the last persisted state.
//! The **recommended** status at any instant is computed by
//! `evaluate::evaluate_status()` from the rental window and the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a rental.
///
/// `Scheduled → Rented → Completed` is the main line; `Cancelled` and
/// `Refunded` are terminal side-exits reachable only through explicit
/// transitions, never through evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Scheduled,
    Rented,
    Completed,
    Cancelled,
    Refunded,
}

impl RentalStatus {
    /// Returns true if no further automatic or predicate-gated transition
    /// is permitted from this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Refunded)
    }

    /// Lowercase name as stored on disk and used in reason strings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Rented => "rented",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RentalStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "rented" => Self::Rented,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            _ => Self::Scheduled,
        }
    }
}

/// Payment status, tracked independently of the lifecycle.
///
/// Only `Refunded` matters to the engine: a refunded rental is frozen and
/// no evaluation or transition may touch it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Partial,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "paid" => Self::Paid,
            "partial" => Self::Partial,
            "refunded" => Self::Refunded,
            _ => Self::Pending,
        }
    }
}

/// An immutable snapshot of a rental record.
///
/// The engine never mutates a snapshot in place: predicates read it,
/// executors and the reconciler return a *new* snapshot, and persisting the
/// result belongs to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Rental {
    pub id: i64,
    /// Unique human handle for the booking (e.g. `atv-dupont-0412`).
    pub reference: String,
    pub customer: String,
    pub vehicle: Option<String>,
    /// Cached status (see `evaluate::evaluate_status()` for the recommendation)
    pub status: RentalStatus,
    pub payment_status: PaymentStatus,
    /// Start of the rental window. Required for evaluation; a missing value
    /// fails closed with a data-quality warning.
    pub start_date: Option<DateTime<Utc>>,
    /// End of the rental window (exclusive).
    pub end_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub started_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
}

impl Rental {
    /// Returns true if the snapshot is frozen: terminal status or a
    /// refunded payment.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.status.is_terminal() || self.payment_status == PaymentStatus::Refunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            RentalStatus::Scheduled,
            RentalStatus::Rented,
            RentalStatus::Completed,
            RentalStatus::Cancelled,
            RentalStatus::Refunded,
        ] {
            assert_eq!(RentalStatus::from(status.to_string()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_scheduled() {
        assert_eq!(
            RentalStatus::from("garbage".to_string()),
            RentalStatus::Scheduled
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(!RentalStatus::Scheduled.is_terminal());
        assert!(!RentalStatus::Rented.is_terminal());
        assert!(RentalStatus::Completed.is_terminal());
        assert!(RentalStatus::Cancelled.is_terminal());
        assert!(RentalStatus::Refunded.is_terminal());
    }
}
