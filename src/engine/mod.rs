//! Core engine modules for rentdesk.

pub mod audit;
pub mod clock;
pub mod db;
pub mod evaluate;
pub mod policy;
pub mod present;
pub mod reconcile;
pub mod repo;
pub mod transition;
pub mod types;
