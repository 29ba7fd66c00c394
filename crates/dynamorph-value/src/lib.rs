//! Universal dynamic-value tree shared by the patch and migration cores.
//!
//! This crate owns exactly one concern: the closed tagged union
//! [`DynamicValue`] and its scalar leaves ([`primitive::PrimitiveValue`]).
//! It has no notion of paths, patches, or schemas — those build on top of it
//! in `dynamorph-optic`, `dynamorph-patch`, and `dynamorph-migration`.

pub mod primitive;
pub mod temporal;
mod value;

pub use primitive::{Currency, PrimitiveValue};
pub use temporal::{
    DayOfWeek, ExactDuration, Month, MonthDay, OffsetTime, Period, Year, YearMonth, ZoneId,
    ZoneOffset, ZonedDateTime,
};
pub use value::{DynamicValue, ValueError, ValueKind};
