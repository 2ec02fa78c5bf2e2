//! Audit trail: records of every status change, user- or system-initiated.
//!
//! The engine only *produces* records; delivery is behind the [`AuditSink`]
//! trait so any persistence target (SQLite table here, a queue or log file
//! elsewhere) can be plugged in by the caller.

use super::types::RentalStatus;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// What happened to the rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Started,
    Completed,
    Cancelled,
    /// Status change applied by the batch reconciler, not by a person.
    Reconciled,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Reconciled => "reconciled",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AuditAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "started" => Self::Started,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Reconciled,
        }
    }
}

/// One entry in the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub rental_id: i64,
    pub action: AuditAction,
    pub actor: String,
    pub old_status: RentalStatus,
    pub new_status: RentalStatus,
    /// Free-text reason (cancellations).
    pub reason: Option<String>,
    /// Action-specific extras, e.g. a closing-media count on completion.
    pub metadata: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Destination for audit records.
///
/// Delivery and retry semantics belong to the implementation; the engine
/// hands over a record and moves on.
pub trait AuditSink {
    /// Persists one record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be stored.
    fn record(&self, record: &AuditRecord) -> Result<()>;
}
