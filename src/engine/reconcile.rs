//! Batch Reconciler: runs the evaluator over a collection of rentals and
//! emits the subset whose persisted status should change.
//!
//! One clock read covers the whole pass, so every snapshot is judged against
//! the same instant and a pass is reproducible. Applying the emitted changes
//! and calling again at the same instant yields an empty result.

use super::audit::{AuditAction, AuditRecord};
use super::evaluate::{evaluate_status, DataQualityWarning};
use super::types::{Rental, RentalStatus};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;

/// Actor recorded on system-initiated changes.
pub const SYSTEM_ACTOR: &str = "system";

/// A rental whose recommended status differs from its stored one.
///
/// `rental` is the stamped new snapshot, ready to persist: system
/// activation fills `started_at`/`started_by`, system completion fills
/// `completed_at`/`completed_by`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub rental: Rental,
    pub old_status: RentalStatus,
    pub new_status: RentalStatus,
}

impl StatusChange {
    /// Synthesizes the audit record for this system-initiated change.
    #[must_use]
    pub fn audit(&self, auto_activate: bool) -> AuditRecord {
        AuditRecord {
            rental_id: self.rental.id,
            action: AuditAction::Reconciled,
            actor: SYSTEM_ACTOR.to_string(),
            old_status: self.old_status,
            new_status: self.new_status,
            reason: None,
            metadata: json!({ "auto_activate": auto_activate }),
            recorded_at: self
                .rental
                .completed_at
                .or(self.rental.started_at)
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Changes in input order; no implied priority.
    pub changes: Vec<StatusChange>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Evaluates every snapshot against a single instant.
///
/// Input is not mutated; only entries whose recommended status differs from
/// the stored one are returned.
#[must_use]
pub fn batch_evaluate(rentals: &[Rental], now: DateTime<Tz>, auto_activate: bool) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for rental in rentals {
        let eval = evaluate_status(rental, now, auto_activate);
        if let Some(warning) = eval.warning {
            outcome.warnings.push(warning);
        }
        if eval.status != rental.status {
            outcome.changes.push(stamp(rental, eval.status, now));
        }
    }
    outcome
}

/// Produces the persistable snapshot for a system-applied status change.
fn stamp(rental: &Rental, new_status: RentalStatus, now: DateTime<Tz>) -> StatusChange {
    let instant = now.with_timezone(&Utc);
    let mut next = rental.clone();
    let old_status = next.status;
    next.status = new_status;
    match new_status {
        RentalStatus::Rented => {
            if next.started_at.is_none() {
                next.started_at = Some(instant);
                next.started_by = Some(SYSTEM_ACTOR.to_string());
            }
        }
        RentalStatus::Completed => {
            if next.completed_at.is_none() {
                next.completed_at = Some(instant);
                next.completed_by = Some(SYSTEM_ACTOR.to_string());
            }
        }
        _ => {}
    }
    StatusChange {
        rental: next,
        old_status,
        new_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PaymentStatus;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn rental(id: i64, status: RentalStatus, start_day: u32, end_day: u32) -> Rental {
        Rental {
            id,
            reference: format!("atv-{id}"),
            customer: "Batch".to_string(),
            vehicle: None,
            status,
            payment_status: PaymentStatus::Paid,
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, end_day, 0, 0, 0).unwrap()),
            started_at: None,
            started_by: None,
            completed_at: None,
            completed_by: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: "2023-12-01".to_string(),
        }
    }

    #[test]
    fn emits_only_differing_snapshots_in_input_order() {
        let rentals = vec![
            rental(1, RentalStatus::Rented, 1, 2),    // past end -> completed
            rental(2, RentalStatus::Scheduled, 10, 11), // future -> unchanged
            rental(3, RentalStatus::Scheduled, 1, 2), // past end -> completed
        ];
        let outcome = batch_evaluate(&rentals, at(3, 0), false);
        let ids: Vec<_> = outcome.changes.iter().map(|c| c.rental.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(outcome
            .changes
            .iter()
            .all(|c| c.new_status == RentalStatus::Completed));
    }

    #[test]
    fn reconciliation_is_idempotent_once_applied() {
        let rentals = vec![
            rental(1, RentalStatus::Scheduled, 1, 5),
            rental(2, RentalStatus::Rented, 1, 2),
        ];
        let now = at(3, 0);
        let first = batch_evaluate(&rentals, now, true);
        assert!(!first.changes.is_empty());

        let applied: Vec<Rental> = rentals
            .iter()
            .map(|r| {
                first
                    .changes
                    .iter()
                    .find(|c| c.rental.id == r.id)
                    .map_or_else(|| r.clone(), |c| c.rental.clone())
            })
            .collect();

        let second = batch_evaluate(&applied, now, true);
        assert!(second.changes.is_empty());
    }

    #[test]
    fn system_completion_stamps_snapshot() {
        let rentals = vec![rental(1, RentalStatus::Rented, 1, 2)];
        let outcome = batch_evaluate(&rentals, at(3, 0), false);
        let change = &outcome.changes[0];
        assert_eq!(change.rental.completed_by.as_deref(), Some(SYSTEM_ACTOR));
        assert_eq!(
            change.rental.completed_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn auto_activation_stamps_start() {
        let rentals = vec![rental(1, RentalStatus::Scheduled, 1, 5)];
        let outcome = batch_evaluate(&rentals, at(2, 0), true);
        let change = &outcome.changes[0];
        assert_eq!(change.new_status, RentalStatus::Rented);
        assert_eq!(change.rental.started_by.as_deref(), Some(SYSTEM_ACTOR));
    }

    #[test]
    fn synthesized_audit_names_the_system() {
        let rentals = vec![rental(1, RentalStatus::Rented, 1, 2)];
        let outcome = batch_evaluate(&rentals, at(3, 0), false);
        let audit = outcome.changes[0].audit(false);
        assert_eq!(audit.actor, SYSTEM_ACTOR);
        assert_eq!(audit.action, AuditAction::Reconciled);
        assert_eq!(audit.old_status, RentalStatus::Rented);
        assert_eq!(audit.new_status, RentalStatus::Completed);
    }

    #[test]
    fn warnings_do_not_halt_the_batch() {
        let mut bad = rental(1, RentalStatus::Scheduled, 1, 2);
        bad.end_date = None;
        let good = rental(2, RentalStatus::Rented, 1, 2);
        let outcome = batch_evaluate(&[bad, good], at(3, 0), false);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].rental.id, 2);
    }

    #[test]
    fn input_is_not_mutated() {
        let rentals = vec![rental(1, RentalStatus::Rented, 1, 2)];
        let _ = batch_evaluate(&rentals, at(3, 0), false);
        assert_eq!(rentals[0].status, RentalStatus::Rented);
        assert!(rentals[0].completed_at.is_none());
    }
}
