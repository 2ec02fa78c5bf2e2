//! CLI command handlers.

pub mod add;
pub mod cancel;
pub mod complete;
pub mod history;
pub mod init;
pub mod list;
pub mod reconcile;
pub mod start;
pub mod status;
pub mod why;

use anyhow::Result;
use rentdesk::engine::clock::{zone_from_env, BusinessClock};

/// Builds the business clock from the environment.
pub(crate) fn business_clock() -> Result<BusinessClock> {
    Ok(BusinessClock::new(&zone_from_env())?)
}
