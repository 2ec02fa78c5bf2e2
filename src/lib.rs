//! Rentdesk: a time-driven lifecycle engine for vehicle rentals.
//!
//! The `engine` module holds the pure core (status evaluation, transition
//! predicates and executors) plus the SQLite adapters that persist rental
//! snapshots and the audit trail.

pub mod engine;
