//! Temporal scalar types that chrono has no direct equivalent for.
//!
//! `Instant`, `LocalDate`, `LocalDateTime`, `LocalTime`, and `OffsetDateTime`
//! map straight onto chrono's `DateTime<Utc>`, `NaiveDate`, `NaiveDateTime`,
//! `NaiveTime`, and `DateTime<FixedOffset>`. The rest — calendar periods,
//! zone identifiers, bare offsets, offset-times, and zoned date-times — have
//! no chrono counterpart and are modeled here as small plain structs.

use serde::{Deserialize, Serialize};

/// A calendar-based duration (years/months/days), as opposed to an exact
/// duration measured in seconds. Distinct from [`crate::primitive::Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Period {
    pub const fn new(years: i32, months: i32, days: i32) -> Self {
        Self { years, months, days }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Adds two periods component-wise.
    pub fn checked_add(self, other: Period) -> Option<Period> {
        Some(Period {
            years: self.years.checked_add(other.years)?,
            months: self.months.checked_add(other.months)?,
            days: self.days.checked_add(other.days)?,
        })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}Y{}M{}D", self.years, self.months, self.days)
    }
}

/// An exact duration, stored as seconds + sub-second nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExactDuration {
    pub secs: i64,
    pub nanos: i32,
}

impl ExactDuration {
    pub const fn new(secs: i64, nanos: i32) -> Self {
        Self { secs, nanos }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn checked_add(self, other: ExactDuration) -> Option<ExactDuration> {
        let total_nanos = self.nanos as i64 + other.nanos as i64;
        let (secs, nanos) = normalize_nanos(self.secs.checked_add(other.secs)?, total_nanos);
        Some(ExactDuration { secs, nanos })
    }
}

fn normalize_nanos(secs: i64, nanos: i64) -> (i64, i32) {
    let extra_secs = nanos.div_euclid(1_000_000_000);
    let nanos = nanos.rem_euclid(1_000_000_000) as i32;
    (secs + extra_secs, nanos)
}

impl std::fmt::Display for ExactDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PT{}.{:09}S", self.secs, self.nanos)
    }
}

/// Month of year, 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Month(pub u8);

/// Month + day-of-month, independent of year (e.g. a recurring anniversary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u8,
    pub day: u8,
}

/// A bare calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Year(pub i32);

/// Year + month, independent of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

/// ISO day of week, 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOfWeek(pub u8);

/// IANA time zone identifier (e.g. "Europe/Berlin"), stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneId(pub String);

/// A fixed UTC offset in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOffset(pub i32);

/// A time-of-day paired with a fixed UTC offset, no date component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetTime {
    pub time: chrono::NaiveTime,
    pub offset_seconds: i32,
}

/// A date-time anchored to a named time zone rather than a bare offset.
/// The offset is carried alongside the zone id so the value is self
/// contained without needing an IANA database at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonedDateTime {
    pub datetime: chrono::DateTime<chrono::FixedOffset>,
    pub zone_id: String,
}
