//! Business Clock: the single time source for the engine.
//!
//! Every time comparison in the engine goes through a `BusinessClock` read.
//! Callers read `now()` once per logical pass and thread the value through,
//! so a whole reconciliation batch observes one consistent instant.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Default business timezone when `RENTDESK_TZ` is unset.
pub const DEFAULT_ZONE: &str = "Africa/Casablanca";

#[derive(Debug, Error)]
pub enum ClockError {
    /// The configured zone is not in the tz database. Fatal: the engine
    /// never guesses a fallback time, since a wrong "now" could silently
    /// auto-complete or auto-activate rentals.
    #[error("unknown timezone '{0}'")]
    UnknownZone(String),
}

/// Supplies "now" in the business's fixed timezone.
///
/// `fixed()` freezes the clock, which is the substitution seam the test
/// suite (and `--dry-run` reproduction) relies on.
#[derive(Debug, Clone)]
pub struct BusinessClock {
    zone: Tz,
    frozen: Option<DateTime<Utc>>,
}

impl BusinessClock {
    /// Creates a clock for the given named timezone.
    ///
    /// # Errors
    /// Returns `ClockError::UnknownZone` if the zone cannot be resolved.
    pub fn new(zone: &str) -> Result<Self, ClockError> {
        let zone: Tz = zone
            .parse()
            .map_err(|_| ClockError::UnknownZone(zone.to_string()))?;
        Ok(Self { zone, frozen: None })
    }

    /// Creates a clock pinned to a fixed instant.
    ///
    /// # Errors
    /// Returns `ClockError::UnknownZone` if the zone cannot be resolved.
    pub fn fixed(zone: &str, instant: DateTime<Utc>) -> Result<Self, ClockError> {
        let mut clock = Self::new(zone)?;
        clock.frozen = Some(instant);
        Ok(clock)
    }

    /// The current instant rendered in the business timezone.
    #[must_use]
    pub fn now(&self) -> DateTime<Tz> {
        self.frozen
            .unwrap_or_else(Utc::now)
            .with_timezone(&self.zone)
    }

    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }
}

/// Resolves the business timezone name from the environment.
#[must_use]
pub fn zone_from_env() -> String {
    std::env::var("RENTDESK_TZ").unwrap_or_else(|_| DEFAULT_ZONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_unknown_zone() {
        let err = BusinessClock::new("Atlantis/Lost").unwrap_err();
        assert!(err.to_string().contains("Atlantis/Lost"));
    }

    #[test]
    fn fixed_clock_is_deterministic() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = BusinessClock::fixed("UTC", instant).unwrap();
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn renders_in_business_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = BusinessClock::fixed(DEFAULT_ZONE, instant).unwrap();
        // Same instant, different wall-clock rendering.
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.zone().name(), DEFAULT_ZONE);
    }
}
