//! Leaf scalar values carried by a [`crate::DynamicValue::Primitive`].

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::temporal::{
    DayOfWeek, ExactDuration, Month, MonthDay, OffsetTime, Period, Year, YearMonth, ZoneId,
    ZoneOffset, ZonedDateTime,
};

/// A monetary amount: a currency code (ISO 4217, e.g. "EUR") plus an
/// arbitrary-precision amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub amount: BigDecimal,
}

/// Every primitive scalar the dynamic-value tree can carry.
///
/// Primitives carry no nested [`crate::DynamicValue`] — they are the leaves
/// of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    Unit,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    Uuid(uuid::Uuid),
    Currency(Currency),

    Instant(chrono::DateTime<chrono::Utc>),
    Duration(ExactDuration),
    LocalDate(chrono::NaiveDate),
    LocalDateTime(chrono::NaiveDateTime),
    LocalTime(chrono::NaiveTime),
    Month(Month),
    MonthDay(MonthDay),
    Year(Year),
    YearMonth(YearMonth),
    Period(Period),
    DayOfWeek(DayOfWeek),
    ZoneId(ZoneId),
    ZoneOffset(ZoneOffset),
    OffsetDateTime(chrono::DateTime<chrono::FixedOffset>),
    OffsetTime(OffsetTime),
    ZonedDateTime(ZonedDateTime),
}

impl PrimitiveValue {
    /// A short, stable name for this primitive's type — used in error
    /// messages and by [`crate::DynamicOptic`]'s `SearchSchema(Primitive(name))`
    /// pattern matching.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Unit => "unit",
            PrimitiveValue::Bool(_) => "bool",
            PrimitiveValue::I8(_) => "i8",
            PrimitiveValue::I16(_) => "i16",
            PrimitiveValue::I32(_) => "i32",
            PrimitiveValue::I64(_) => "i64",
            PrimitiveValue::U8(_) => "u8",
            PrimitiveValue::U16(_) => "u16",
            PrimitiveValue::U32(_) => "u32",
            PrimitiveValue::U64(_) => "u64",
            PrimitiveValue::F32(_) => "f32",
            PrimitiveValue::F64(_) => "f64",
            PrimitiveValue::Char(_) => "char",
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::BigInt(_) => "bigint",
            PrimitiveValue::BigDecimal(_) => "bigdecimal",
            PrimitiveValue::Uuid(_) => "uuid",
            PrimitiveValue::Currency(_) => "currency",
            PrimitiveValue::Instant(_) => "instant",
            PrimitiveValue::Duration(_) => "duration",
            PrimitiveValue::LocalDate(_) => "local-date",
            PrimitiveValue::LocalDateTime(_) => "local-date-time",
            PrimitiveValue::LocalTime(_) => "local-time",
            PrimitiveValue::Month(_) => "month",
            PrimitiveValue::MonthDay(_) => "month-day",
            PrimitiveValue::Year(_) => "year",
            PrimitiveValue::YearMonth(_) => "year-month",
            PrimitiveValue::Period(_) => "period",
            PrimitiveValue::DayOfWeek(_) => "day-of-week",
            PrimitiveValue::ZoneId(_) => "zone-id",
            PrimitiveValue::ZoneOffset(_) => "zone-offset",
            PrimitiveValue::OffsetDateTime(_) => "offset-date-time",
            PrimitiveValue::OffsetTime(_) => "offset-time",
            PrimitiveValue::ZonedDateTime(_) => "zoned-date-time",
        }
    }

    /// True for the primitive kinds the differ/patch engine can compute an
    /// additive delta for (see spec §4.3 / §4.4).
    pub fn supports_delta(&self) -> bool {
        matches!(
            self,
            PrimitiveValue::I8(_)
                | PrimitiveValue::I16(_)
                | PrimitiveValue::I32(_)
                | PrimitiveValue::I64(_)
                | PrimitiveValue::F32(_)
                | PrimitiveValue::F64(_)
                | PrimitiveValue::BigInt(_)
                | PrimitiveValue::BigDecimal(_)
                | PrimitiveValue::String(_)
                | PrimitiveValue::Instant(_)
                | PrimitiveValue::Duration(_)
                | PrimitiveValue::LocalDate(_)
                | PrimitiveValue::LocalDateTime(_)
                | PrimitiveValue::Period(_)
        )
    }

    /// Renders the primitive's canonical string form, used by `Resolved::Concat`
    /// (spec §4.5) to coerce primitives into joinable text.
    pub fn to_canonical_string(&self) -> String {
        match self {
            PrimitiveValue::Unit => String::new(),
            PrimitiveValue::Bool(b) => b.to_string(),
            PrimitiveValue::I8(n) => n.to_string(),
            PrimitiveValue::I16(n) => n.to_string(),
            PrimitiveValue::I32(n) => n.to_string(),
            PrimitiveValue::I64(n) => n.to_string(),
            PrimitiveValue::U8(n) => n.to_string(),
            PrimitiveValue::U16(n) => n.to_string(),
            PrimitiveValue::U32(n) => n.to_string(),
            PrimitiveValue::U64(n) => n.to_string(),
            PrimitiveValue::F32(n) => n.to_string(),
            PrimitiveValue::F64(n) => n.to_string(),
            PrimitiveValue::Char(c) => c.to_string(),
            PrimitiveValue::String(s) => s.clone(),
            PrimitiveValue::BigInt(n) => n.to_string(),
            PrimitiveValue::BigDecimal(n) => n.to_string(),
            PrimitiveValue::Uuid(u) => u.to_string(),
            PrimitiveValue::Currency(c) => format!("{} {}", c.amount, c.code),
            PrimitiveValue::Instant(t) => t.to_rfc3339(),
            PrimitiveValue::Duration(d) => d.to_string(),
            PrimitiveValue::LocalDate(d) => d.to_string(),
            PrimitiveValue::LocalDateTime(d) => d.to_string(),
            PrimitiveValue::LocalTime(t) => t.to_string(),
            PrimitiveValue::Month(m) => m.0.to_string(),
            PrimitiveValue::MonthDay(m) => format!("{:02}-{:02}", m.month, m.day),
            PrimitiveValue::Year(y) => y.0.to_string(),
            PrimitiveValue::YearMonth(y) => format!("{:04}-{:02}", y.year, y.month),
            PrimitiveValue::Period(p) => p.to_string(),
            PrimitiveValue::DayOfWeek(d) => d.0.to_string(),
            PrimitiveValue::ZoneId(z) => z.0.clone(),
            PrimitiveValue::ZoneOffset(z) => z.0.to_string(),
            PrimitiveValue::OffsetDateTime(t) => t.to_rfc3339(),
            PrimitiveValue::OffsetTime(t) => {
                let sign = if t.offset_seconds < 0 { '-' } else { '+' };
                let abs = t.offset_seconds.unsigned_abs();
                format!("{}{sign}{:02}:{:02}", t.time, abs / 3600, (abs % 3600) / 60)
            }
            PrimitiveValue::ZonedDateTime(z) => format!("{}[{}]", z.datetime.to_rfc3339(), z.zone_id),
        }
    }

    /// True if this value is a floating point NaN — forces `Set` instead of a
    /// delta in the differ (spec §4.3).
    pub fn is_nan(&self) -> bool {
        match self {
            PrimitiveValue::F32(f) => f.is_nan(),
            PrimitiveValue::F64(f) => f.is_nan(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PrimitiveValue::I32(1), "i32")]
    #[test_case(PrimitiveValue::String("x".into()), "string")]
    #[test_case(PrimitiveValue::Unit, "unit")]
    fn kind_name_matches(value: PrimitiveValue, expected: &str) {
        assert_eq!(value.kind_name(), expected);
    }

    #[test]
    fn nan_forces_set() {
        assert!(PrimitiveValue::F64(f64::NAN).is_nan());
        assert!(!PrimitiveValue::F64(1.0).is_nan());
    }

    #[test]
    fn supports_delta_excludes_bool() {
        assert!(!PrimitiveValue::Bool(true).supports_delta());
        assert!(PrimitiveValue::I32(1).supports_delta());
    }

    #[test]
    fn canonical_string_for_bool() {
        assert_eq!(PrimitiveValue::Bool(true).to_canonical_string(), "true");
    }
}
