//! Display timezone used to localise article timestamps.
//!
//! Timestamps are stored and compared in UTC. Responses additionally carry the
//! same instants rendered in the configured display timezone so clients can
//! show local times without a timezone database.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;

/// Errors returned when parsing a timezone name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timezone: {name}")]
pub struct TimezoneValidationError {
    /// The rejected name.
    pub name: String,
}

/// IANA timezone applied to timestamps in responses.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use newsroom::domain::DisplayTimezone;
///
/// let tz: DisplayTimezone = "Asia/Tokyo".parse().unwrap();
/// let instant = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(tz.localize(instant), "2026-01-01T09:00:00+09:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTimezone(Tz);

impl DisplayTimezone {
    /// The IANA name of the zone.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Render `instant` in this zone as RFC 3339 with an explicit offset.
    pub fn localize(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl Default for DisplayTimezone {
    fn default() -> Self {
        Self(Tz::UTC)
    }
}

impl FromStr for DisplayTimezone {
    type Err = TimezoneValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| TimezoneValidationError { name: s.to_owned() })
    }
}

impl fmt::Display for DisplayTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
