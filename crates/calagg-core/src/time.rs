//! Time values as they travel over the wire.
//!
//! The service accepts instants as UTC ISO-8601 strings
//! (`2024-03-15T09:30:00Z`) and all-day values as plain dates
//! (`2024-03-15`). [`EventTime`] covers both and always serializes to one of
//! those two forms, whatever timezone the caller built it from.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Formats a datetime in any timezone as a UTC ISO-8601 string.
///
/// Sub-second precision is dropped and the offset is always written as `Z`.
pub fn to_utc_iso8601<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A time value sent to or received from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
    /// A specific instant, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A calendar date with no time component.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates an instant from a datetime in any timezone.
    pub fn from_local<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::DateTime(dt.with_timezone(&Utc))
    }

    /// Creates an all-day value.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` for all-day values.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the wire representation.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::DateTime(dt) => to_utc_iso8601(dt),
            Self::AllDay(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Parses a wire value, accepting RFC 3339 instants or `YYYY-MM-DD` dates.
    pub fn parse(value: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::DateTime(dt.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(Self::AllDay)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for EventTime {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::from_local(dt)
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventTimeVisitor;

        impl Visitor<'_> for EventTimeVisitor {
            type Value = EventTime;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an ISO-8601 datetime or a YYYY-MM-DD date")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<EventTime, E> {
                EventTime::parse(value)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(EventTimeVisitor)
    }
}
