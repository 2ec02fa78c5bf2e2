//! Status Evaluator: derives what a rental's status *should* be right now.
//!
//! This is the truth oracle of the engine. It is pure and advisory: it
//! recommends a status from the rental window and the supplied instant, and
//! leaves persisting that recommendation to the caller (the reconciler).

use super::types::{PaymentStatus, Rental, RentalStatus};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Non-fatal signal that a snapshot is missing required date fields.
///
/// Evaluation fails closed: the status is left unchanged rather than
/// guessed, and the warning is reported so the record can be repaired.
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityWarning {
    pub rental_id: i64,
    pub reference: String,
    pub detail: String,
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub status: RentalStatus,
    pub warning: Option<DataQualityWarning>,
}

impl Evaluation {
    fn keep(status: RentalStatus) -> Self {
        Self {
            status,
            warning: None,
        }
    }
}

/// Derives the recommended status of a rental at the given instant.
///
/// Rules, in priority order:
/// 1. Terminal statuses and refunded payments are frozen.
/// 2. A missing window date leaves the status unchanged (with a warning).
/// 3. Past the window end, the rental is completed.
/// 4. Inside the window, an active rental stays active.
/// 5. Inside the window, `auto_activate` moves scheduled to rented.
/// 6. Before the window, an already-active rental stays active (manual
///    early hand-over is never re-derived away); otherwise scheduled.
///
/// # Arguments
/// * `now` - read the clock once per batch and pass the same instant in.
#[must_use]
pub fn evaluate_status(rental: &Rental, now: DateTime<Tz>, auto_activate: bool) -> Evaluation {
    if rental.payment_status == PaymentStatus::Refunded || rental.status.is_terminal() {
        return Evaluation::keep(rental.status);
    }

    let (Some(start), Some(end)) = (rental.start_date, rental.end_date) else {
        return Evaluation {
            status: rental.status,
            warning: Some(missing_dates_warning(rental)),
        };
    };

    let now = now.with_timezone(&chrono::Utc);

    if now >= end {
        return Evaluation::keep(RentalStatus::Completed);
    }

    if now >= start {
        if rental.status == RentalStatus::Rented {
            return Evaluation::keep(RentalStatus::Rented);
        }
        if auto_activate && rental.status == RentalStatus::Scheduled {
            return Evaluation::keep(RentalStatus::Rented);
        }
        return Evaluation::keep(rental.status);
    }

    // Before the window: preserve early manual activation.
    if rental.status == RentalStatus::Rented {
        Evaluation::keep(RentalStatus::Rented)
    } else {
        Evaluation::keep(RentalStatus::Scheduled)
    }
}

fn missing_dates_warning(rental: &Rental) -> DataQualityWarning {
    let detail = match (rental.start_date.is_none(), rental.end_date.is_none()) {
        (true, true) => "missing start and end dates",
        (true, false) => "missing start date",
        _ => "missing end date",
    };
    DataQualityWarning {
        rental_id: rental.id,
        reference: rental.reference.clone(),
        detail: detail.to_string(),
    }
}
