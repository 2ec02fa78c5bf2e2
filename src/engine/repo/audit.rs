//! Audit Repository: the SQLite-backed audit sink.

use crate::engine::audit::{AuditAction, AuditRecord, AuditSink};
use crate::engine::types::RentalStatus;
use anyhow::Result;
use rusqlite::{params, Connection};

pub struct AuditRepo<'a> {
    conn: &'a Connection,
}

impl<'a> AuditRepo<'a> {
    /// Creates a new audit repository instance.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Retrieves the audit history for one rental, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn history_for(&self, rental_id: i64) -> Result<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT rental_id, action, actor, old_status, new_status, reason, metadata, recorded_at \
             FROM audit_log WHERE rental_id = ?1 ORDER BY recorded_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![rental_id], row_to_record)?;
        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// Retrieves global audit history joined with rental references,
    /// newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn global_history(&self, limit: usize) -> Result<Vec<(String, AuditRecord)>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.reference, a.rental_id, a.action, a.actor, a.old_status, a.new_status, \
                    a.reason, a.metadata, a.recorded_at \
             FROM audit_log a \
             JOIN rentals r ON a.rental_id = r.id \
             ORDER BY a.recorded_at DESC, a.id DESC \
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let reference: String = row.get(0)?;
            let record = AuditRecord {
                rental_id: row.get(1)?,
                action: AuditAction::from(row.get::<_, String>(2)?),
                actor: row.get(3)?,
                old_status: RentalStatus::from(row.get::<_, String>(4)?),
                new_status: RentalStatus::from(row.get::<_, String>(5)?),
                reason: row.get(6)?,
                metadata: parse_metadata(row.get::<_, String>(7)?),
                recorded_at: row.get(8)?,
            };
            Ok((reference, record))
        })?;

        let mut history = Vec::new();
        for item in rows {
            history.push(item?);
        }
        Ok(history)
    }
}

impl AuditSink for AuditRepo<'_> {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO audit_log (rental_id, action, actor, old_status, new_status, reason, metadata, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.rental_id,
                record.action.to_string(),
                record.actor,
                record.old_status.to_string(),
                record.new_status.to_string(),
                record.reason,
                record.metadata.to_string(),
                record.recorded_at,
            ],
        )?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AuditRecord> {
    Ok(AuditRecord {
        rental_id: row.get(0)?,
        action: AuditAction::from(row.get::<_, String>(1)?),
        actor: row.get(2)?,
        old_status: RentalStatus::from(row.get::<_, String>(3)?),
        new_status: RentalStatus::from(row.get::<_, String>(4)?),
        reason: row.get(5)?,
        metadata: parse_metadata(row.get::<_, String>(6)?),
        recorded_at: row.get(7)?,
    })
}

fn parse_metadata(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use crate::engine::repo::rentals::{NewRental, RentalRepo};
    use crate::engine::types::PaymentStatus;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn record_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Db::connect_at(&dir.path().join("rentals.db")).unwrap();
        let rentals = RentalRepo::new(&conn);
        let id = rentals
            .add(&NewRental {
                reference: "audit-case".to_string(),
                customer: "Audit".to_string(),
                vehicle: None,
                start_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                end_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
                payment_status: PaymentStatus::Paid,
            })
            .unwrap();

        let audit = AuditRepo::new(&conn);
        audit
            .record(&AuditRecord {
                rental_id: id,
                action: AuditAction::Started,
                actor: "alice".to_string(),
                old_status: RentalStatus::Scheduled,
                new_status: RentalStatus::Rented,
                reason: None,
                metadata: json!({}),
                recorded_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            })
            .unwrap();
        audit
            .record(&AuditRecord {
                rental_id: id,
                action: AuditAction::Completed,
                actor: "alice".to_string(),
                old_status: RentalStatus::Rented,
                new_status: RentalStatus::Completed,
                reason: None,
                metadata: json!({ "closing_media": 3 }),
                recorded_at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            })
            .unwrap();

        let history = audit.history_for(id).unwrap();
        assert_eq!(history.len(), 2);
        // Newest first.
        assert_eq!(history[0].action, AuditAction::Completed);
        assert_eq!(history[0].metadata["closing_media"], 3);
        assert_eq!(history[1].action, AuditAction::Started);
        assert_eq!(history[1].actor, "alice");

        let global = audit.global_history(10).unwrap();
        assert_eq!(global.len(), 2);
        assert_eq!(global[0].0, "audit-case");
    }
}
