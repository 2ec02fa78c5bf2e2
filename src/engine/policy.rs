//! Transition Policy: predicates deciding which lifecycle moves are legal.
//!
//! Predicates never error. They return a structured [`Decision`] so that a
//! denial always carries the human-readable reason staff will see; the
//! executors in `transition.rs` surface that reason verbatim.

use super::types::{Rental, RentalStatus};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Outcome of a predicate check.
#[derive(Debug, Clone)]
pub struct Decision {
    allowed: bool,
    reason: Option<String>,
}

impl Decision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Consumes the decision, yielding the denial reason if denied.
    #[must_use]
    pub fn denied(self) -> Option<String> {
        if self.allowed {
            None
        } else {
            Some(self.reason.unwrap_or_default())
        }
    }
}

/// A user-facing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Complete,
    Cancel,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Business rules governing transitions.
///
/// The early-start allowance lets staff hand over a vehicle before the
/// scheduled window (default 24h). There is no late bound: starting after
/// the scheduled time is always legal, which absorbs no-shows and delays.
#[derive(Debug, Clone)]
pub struct TransitionPolicy {
    early_start: Duration,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            early_start: Duration::hours(24),
        }
    }
}

impl TransitionPolicy {
    #[must_use]
    pub fn with_early_start_hours(hours: i64) -> Self {
        Self {
            early_start: Duration::hours(hours),
        }
    }

    /// Reads `RENTDESK_EARLY_START_HOURS` if set, else the 24h default.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("RENTDESK_EARLY_START_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or_else(Self::default, Self::with_early_start_hours)
    }

    #[must_use]
    pub fn early_start_hours(&self) -> i64 {
        self.early_start.num_hours()
    }

    /// May this rental be started right now?
    #[must_use]
    pub fn can_start(&self, rental: &Rental, now: DateTime<Tz>) -> Decision {
        if rental.status != RentalStatus::Scheduled {
            return Decision::deny(format!(
                "Rental is {}, not scheduled",
                rental.status
            ));
        }
        if rental.started_at.is_some() {
            return Decision::deny("Rental has already been started");
        }
        let Some(start) = rental.start_date else {
            return Decision::deny("Rental has no scheduled start date");
        };
        if now.with_timezone(&chrono::Utc) < start - self.early_start {
            return Decision::deny(format!(
                "Too early: rental begins {} and may start at most {} hours before",
                start.to_rfc3339(),
                self.early_start.num_hours()
            ));
        }
        Decision::allow()
    }

    /// May this rental be completed right now?
    #[must_use]
    pub fn can_complete(&self, rental: &Rental, _now: DateTime<Tz>) -> Decision {
        if rental.status != RentalStatus::Rented {
            return Decision::deny(format!("Rental is {}, not rented", rental.status));
        }
        if rental.started_at.is_none() {
            return Decision::deny("Rental has not been started");
        }
        Decision::allow()
    }

    /// May this rental be cancelled right now?
    #[must_use]
    pub fn can_cancel(&self, rental: &Rental, _now: DateTime<Tz>) -> Decision {
        if rental.status.is_terminal() {
            return Decision::deny(format!("Cannot cancel {} rental", rental.status));
        }
        Decision::allow()
    }

    /// The subset of actions currently legal for a snapshot.
    #[must_use]
    pub fn available_actions(&self, rental: &Rental, now: DateTime<Tz>) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.can_start(rental, now).is_allowed() {
            actions.push(Action::Start);
        }
        if self.can_complete(rental, now).is_allowed() {
            actions.push(Action::Complete);
        }
        if self.can_cancel(rental, now).is_allowed() {
            actions.push(Action::Cancel);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PaymentStatus;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn rental(status: RentalStatus) -> Rental {
        Rental {
            id: 1,
            reference: "atv-test".to_string(),
            customer: "Test Customer".to_string(),
            vehicle: None,
            status,
            payment_status: PaymentStatus::Paid,
            start_date: Some(utc(2024, 1, 1, 0, 0)),
            end_date: Some(utc(2024, 1, 2, 0, 0)),
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
    fn start_denied_48h_early() {
        let policy = TransitionPolicy::default();
        let mut r = rental(RentalStatus::Scheduled);
        r.start_date = Some(utc(2024, 1, 3, 0, 0));
        let decision = policy.can_start(&r, at(2024, 1, 1, 0, 0));
        assert!(!decision.is_allowed());
        assert!(decision.reason().unwrap().contains("Too early"));
    }

    #[test]
    fn start_allowed_12h_early() {
        let policy = TransitionPolicy::default();
        let mut r = rental(RentalStatus::Scheduled);
        r.start_date = Some(utc(2024, 1, 1, 12, 0));
        assert!(policy.can_start(&r, at(2024, 1, 1, 0, 0)).is_allowed());
    }

    #[test]
    fn late_start_always_allowed() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Scheduled);
        assert!(policy.can_start(&r, at(2024, 3, 1, 0, 0)).is_allowed());
    }

    #[test]
    fn start_denied_when_not_scheduled() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Completed);
        let decision = policy.can_start(&r, at(2024, 1, 1, 0, 0));
        assert_eq!(
            decision.reason().unwrap(),
            "Rental is completed, not scheduled"
        );
    }

    #[test]
    fn start_denied_when_already_started() {
        let policy = TransitionPolicy::default();
        let mut r = rental(RentalStatus::Scheduled);
        r.started_at = Some(utc(2024, 1, 1, 0, 0));
        let decision = policy.can_start(&r, at(2024, 1, 1, 1, 0));
        assert_eq!(decision.reason().unwrap(), "Rental has already been started");
    }

    #[test]
    fn start_denied_without_start_date() {
        let policy = TransitionPolicy::default();
        let mut r = rental(RentalStatus::Scheduled);
        r.start_date = None;
        assert!(!policy.can_start(&r, at(2024, 1, 1, 0, 0)).is_allowed());
    }

    #[test]
    fn complete_denied_when_never_started() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Rented);
        let decision = policy.can_complete(&r, at(2024, 1, 1, 12, 0));
        assert_eq!(decision.reason().unwrap(), "Rental has not been started");
    }

    #[test]
    fn complete_allowed_any_time_once_started() {
        let policy = TransitionPolicy::default();
        let mut r = rental(RentalStatus::Rented);
        r.started_at = Some(utc(2024, 1, 1, 0, 0));
        // Well before the window end, and well after it.
        assert!(policy.can_complete(&r, at(2024, 1, 1, 0, 30)).is_allowed());
        assert!(policy.can_complete(&r, at(2024, 2, 1, 0, 0)).is_allowed());
    }

    #[test]
    fn cancel_denied_for_completed() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Completed);
        let decision = policy.can_cancel(&r, at(2024, 1, 1, 0, 0));
        assert_eq!(decision.reason().unwrap(), "Cannot cancel completed rental");
    }

    #[test]
    fn cancel_allowed_for_scheduled_and_rented() {
        let policy = TransitionPolicy::default();
        assert!(policy
            .can_cancel(&rental(RentalStatus::Scheduled), at(2024, 1, 1, 0, 0))
            .is_allowed());
        assert!(policy
            .can_cancel(&rental(RentalStatus::Rented), at(2024, 1, 1, 0, 0))
            .is_allowed());
    }

    #[test]
    fn available_actions_for_scheduled() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Scheduled);
        let actions = policy.available_actions(&r, at(2024, 1, 1, 0, 0));
        assert_eq!(actions, vec![Action::Start, Action::Cancel]);
    }

    #[test]
    fn no_actions_for_cancelled() {
        let policy = TransitionPolicy::default();
        let r = rental(RentalStatus::Cancelled);
        assert!(policy.available_actions(&r, at(2024, 1, 1, 0, 0)).is_empty());
    }

    #[test]
    fn configurable_early_start_window() {
        let policy = TransitionPolicy::with_early_start_hours(2);
        let mut r = rental(RentalStatus::Scheduled);
        r.start_date = Some(utc(2024, 1, 1, 12, 0));
        // 12h before start is outside a 2h allowance.
        assert!(!policy.can_start(&r, at(2024, 1, 1, 0, 0)).is_allowed());
        assert!(policy.can_start(&r, at(2024, 1, 1, 10, 30)).is_allowed());
    }
}
