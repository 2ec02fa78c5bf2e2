//! Persistence adapters: rental snapshots and the audit trail.

pub mod audit;
pub mod rentals;

pub use audit::AuditRepo;
pub use rentals::{reference_from, NewRental, RentalRepo, RENTAL_SELECT};
