//! Rental Repository: the snapshot store.
//!
//! The engine treats snapshots as immutable values; this repository is the
//! caller-side persistence that accepts updated snapshots back. `apply()`
//! writes a whole transitioned snapshot, so the write-back is one statement
//! regardless of which transition produced it.

use crate::engine::types::{PaymentStatus, Rental, RentalStatus};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub const RENTAL_SELECT: &str = "SELECT id, reference, customer, vehicle, status, payment_status, \
     start_date, end_date, started_at, started_by, completed_at, completed_by, \
     cancelled_at, cancelled_by, cancellation_reason, created_at FROM rentals";

/// Fields supplied when booking a rental. Snapshots are born `scheduled`.
#[derive(Debug, Clone)]
pub struct NewRental {
    pub reference: String,
    pub customer: String,
    pub vehicle: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
}

pub struct RentalRepo<'a> {
    conn: &'a Connection,
}

impl<'a> RentalRepo<'a> {
    /// Creates a new repository instance borrowing the connection.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying database connection.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        self.conn
    }

    /// Books a new rental.
    ///
    /// # Errors
    /// Returns an error if the reference already exists or insertion fails.
    pub fn add(&self, rental: &NewRental) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO rentals (reference, customer, vehicle, status, payment_status, start_date, end_date) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    rental.reference,
                    rental.customer,
                    rental.vehicle,
                    RentalStatus::Scheduled.to_string(),
                    rental.payment_status.to_string(),
                    rental.start_date,
                    rental.end_date,
                ],
            )
            .with_context(|| format!("Cannot book rental '{}'", rental.reference))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Retrieves all rentals.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Rental>> {
        let mut stmt = self.conn.prepare(RENTAL_SELECT)?;
        let rows = stmt.query_map([], row_to_rental)?;
        let mut rentals = Vec::new();
        for rental in rows {
            rentals.push(rental?);
        }
        Ok(rentals)
    }

    /// Finds a rental by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Rental>> {
        let sql = format!("{RENTAL_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_rental)
            .optional()
            .context("Search by ID failed")
    }

    /// Finds a rental by its reference (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_reference(&self, reference: &str) -> Result<Option<Rental>> {
        let sql = format!("{RENTAL_SELECT} WHERE LOWER(reference) = LOWER(?1)");
        self.conn
            .query_row(&sql, params![reference], row_to_rental)
            .optional()
            .context("Search by reference failed")
    }

    /// Resolves a user query (numeric ID or reference) into a rental.
    ///
    /// Staff act on a specific booking, so resolution is strict: exact ID
    /// or exact reference only.
    ///
    /// # Errors
    /// Returns an error if no rental matches.
    pub fn resolve(&self, query: &str) -> Result<Rental> {
        if let Ok(id) = query.parse::<i64>() {
            if let Some(rental) = self.find_by_id(id)? {
                return Ok(rental);
            }
        }
        if let Some(rental) = self.find_by_reference(query)? {
            return Ok(rental);
        }
        bail!("No rental matches '{query}'");
    }

    /// Persists a transitioned or reconciled snapshot.
    ///
    /// # Errors
    /// Returns an error if the rental does not exist or the update fails.
    pub fn apply(&self, rental: &Rental) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE rentals SET status = ?1, payment_status = ?2, \
             started_at = ?3, started_by = ?4, completed_at = ?5, completed_by = ?6, \
             cancelled_at = ?7, cancelled_by = ?8, cancellation_reason = ?9 \
             WHERE id = ?10",
            params![
                rental.status.to_string(),
                rental.payment_status.to_string(),
                rental.started_at,
                rental.started_by,
                rental.completed_at,
                rental.completed_by,
                rental.cancelled_at,
                rental.cancelled_by,
                rental.cancellation_reason,
                rental.id,
            ],
        )?;
        if updated == 0 {
            bail!("Rental #{} not found in store", rental.id);
        }
        Ok(())
    }
}

/// Converts a database row to a Rental snapshot.
fn row_to_rental(row: &rusqlite::Row) -> rusqlite::Result<Rental> {
    Ok(Rental {
        id: row.get(0)?,
        reference: row.get(1)?,
        customer: row.get(2)?,
        vehicle: row.get(3)?,
        status: RentalStatus::from(row.get::<_, String>(4)?),
        payment_status: PaymentStatus::from(row.get::<_, String>(5)?),
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        started_at: row.get(8)?,
        started_by: row.get(9)?,
        completed_at: row.get(10)?,
        completed_by: row.get(11)?,
        cancelled_at: row.get(12)?,
        cancelled_by: row.get(13)?,
        cancellation_reason: row.get(14)?,
        created_at: row.get(15)?,
    })
}

/// Builds a booking reference from the customer name and start date,
/// e.g. "Ayoub El Idrissi" + April 12 -> `ayoub-el-idrissi-0412`.
#[must_use]
pub fn reference_from(customer: &str, start: Option<DateTime<Utc>>) -> String {
    let slug: String = customer
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-");
    match start {
        Some(date) => format!("{slug}-{:02}{:02}", date.month(), date.day()),
        None => slug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use crate::engine::policy::TransitionPolicy;
    use crate::engine::transition;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn open() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = Db::connect_at(&dir.path().join("rentals.db")).unwrap();
        (dir, conn)
    }

    fn booking(reference: &str) -> NewRental {
        NewRental {
            reference: reference.to_string(),
            customer: "Ayoub El Idrissi".to_string(),
            vehicle: Some("ATV-01".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2024, 4, 12, 9, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 4, 12, 17, 0, 0).unwrap()),
            payment_status: PaymentStatus::Paid,
        }
    }

    #[test]
    fn add_and_resolve() {
        let (_dir, conn) = open();
        let repo = RentalRepo::new(&conn);
        let id = repo.add(&booking("ayoub-0412")).unwrap();

        let by_id = repo.resolve(&id.to_string()).unwrap();
        assert_eq!(by_id.reference, "ayoub-0412");
        assert_eq!(by_id.status, RentalStatus::Scheduled);
        assert_eq!(
            by_id.start_date,
            Some(Utc.with_ymd_and_hms(2024, 4, 12, 9, 0, 0).unwrap())
        );

        let by_ref = repo.resolve("AYOUB-0412").unwrap();
        assert_eq!(by_ref.id, id);

        assert!(repo.resolve("nonexistent").is_err());
    }

    #[test]
    fn duplicate_reference_rejected() {
        let (_dir, conn) = open();
        let repo = RentalRepo::new(&conn);
        repo.add(&booking("dup")).unwrap();
        assert!(repo.add(&booking("dup")).is_err());
    }

    #[test]
    fn apply_persists_transitioned_snapshot() {
        let (_dir, conn) = open();
        let repo = RentalRepo::new(&conn);
        let id = repo.add(&booking("round-trip")).unwrap();
        let rental = repo.find_by_id(id).unwrap().unwrap();

        let now: chrono::DateTime<Tz> = chrono_tz::UTC
            .with_ymd_and_hms(2024, 4, 12, 9, 30, 0)
            .unwrap();
        let policy = TransitionPolicy::default();
        let outcome = transition::start(&rental, "fatima", &policy, now).unwrap();
        repo.apply(&outcome.rental).unwrap();

        let stored = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, RentalStatus::Rented);
        assert_eq!(stored.started_by.as_deref(), Some("fatima"));
        assert_eq!(
            stored.started_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 12, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn apply_unknown_rental_fails() {
        let (_dir, conn) = open();
        let repo = RentalRepo::new(&conn);
        let id = repo.add(&booking("ghost")).unwrap();
        let mut rental = repo.find_by_id(id).unwrap().unwrap();
        rental.id = 999;
        assert!(repo.apply(&rental).is_err());
    }

    #[test]
    fn reference_generation() {
        let start = Some(Utc.with_ymd_and_hms(2024, 4, 12, 9, 0, 0).unwrap());
        assert_eq!(
            reference_from("Ayoub El Idrissi", start),
            "ayoub-el-idrissi-0412"
        );
        assert_eq!(reference_from("No Date!", None), "no-date");
    }
}
