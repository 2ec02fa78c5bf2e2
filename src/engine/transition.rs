//! Transition Executors: apply a legal lifecycle move to a snapshot.
//!
//! Each executor consults the matching predicate first and fails with the
//! predicate's reason verbatim when the move is illegal. Unlike evaluation,
//! these are caller-facing commands: invoking one means the caller expected
//! it to succeed, so a denial is an error, never a silent no-op.

use super::audit::{AuditAction, AuditRecord};
use super::policy::TransitionPolicy;
use super::types::{Rental, RentalStatus};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    /// The transition was invoked while its predicate denies it. Either a
    /// UI allowed an action it shouldn't, or two actors raced.
    #[error("{reason}")]
    IllegalTransition { reason: String },
}

/// A successful transition: the new snapshot plus its audit record.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub rental: Rental,
    pub audit: AuditRecord,
}

/// Marks a scheduled rental as handed over.
///
/// # Errors
/// Returns `IllegalTransition` if `can_start` denies.
pub fn start(
    rental: &Rental,
    actor: &str,
    policy: &TransitionPolicy,
    now: DateTime<Tz>,
) -> Result<Outcome, TransitionError> {
    if let Some(reason) = policy.can_start(rental, now).denied() {
        return Err(TransitionError::IllegalTransition { reason });
    }
    let instant = now.with_timezone(&Utc);
    let mut next = rental.clone();
    next.status = RentalStatus::Rented;
    next.started_at = Some(instant);
    next.started_by = Some(actor.to_string());
    let audit = AuditRecord {
        rental_id: rental.id,
        action: AuditAction::Started,
        actor: actor.to_string(),
        old_status: rental.status,
        new_status: next.status,
        reason: None,
        metadata: json!({}),
        recorded_at: instant,
    };
    Ok(Outcome { rental: next, audit })
}

/// Closes out an active rental.
///
/// `closing_media` is the number of return photos/videos captured at
/// hand-back; it lands in the audit metadata for traceability.
///
/// # Errors
/// Returns `IllegalTransition` if `can_complete` denies.
pub fn complete(
    rental: &Rental,
    actor: &str,
    closing_media: Option<u32>,
    policy: &TransitionPolicy,
    now: DateTime<Tz>,
) -> Result<Outcome, TransitionError> {
    if let Some(reason) = policy.can_complete(rental, now).denied() {
        return Err(TransitionError::IllegalTransition { reason });
    }
    let instant = now.with_timezone(&Utc);
    let mut next = rental.clone();
    next.status = RentalStatus::Completed;
    next.completed_at = Some(instant);
    next.completed_by = Some(actor.to_string());
    let metadata = match closing_media {
        Some(count) => json!({ "closing_media": count }),
        None => json!({}),
    };
    let audit = AuditRecord {
        rental_id: rental.id,
        action: AuditAction::Completed,
        actor: actor.to_string(),
        old_status: rental.status,
        new_status: next.status,
        reason: None,
        metadata,
        recorded_at: instant,
    };
    Ok(Outcome { rental: next, audit })
}

/// Cancels a scheduled or active rental.
///
/// # Errors
/// Returns `IllegalTransition` if `can_cancel` denies.
pub fn cancel(
    rental: &Rental,
    actor: &str,
    reason: &str,
    policy: &TransitionPolicy,
    now: DateTime<Tz>,
) -> Result<Outcome, TransitionError> {
    if let Some(denial) = policy.can_cancel(rental, now).denied() {
        return Err(TransitionError::IllegalTransition { reason: denial });
    }
    let instant = now.with_timezone(&Utc);
    let mut next = rental.clone();
    next.status = RentalStatus::Cancelled;
    next.cancelled_at = Some(instant);
    next.cancelled_by = Some(actor.to_string());
    next.cancellation_reason = Some(reason.to_string());
    let audit = AuditRecord {
        rental_id: rental.id,
        action: AuditAction::Cancelled,
        actor: actor.to_string(),
        old_status: rental.status,
        new_status: next.status,
        reason: Some(reason.to_string()),
        metadata: json!({}),
        recorded_at: instant,
    };
    Ok(Outcome { rental: next, audit })
}
