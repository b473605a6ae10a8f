//! The four TOML date/time flavours.
//!
//! ```rust
//! use toml_cursor::Datetime;
//!
//! let zoned: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
//! let floating: Datetime = "1979-05-27T07:32:00".parse().unwrap();
//! assert!(zoned.is_offset());
//! assert!(!floating.is_offset());
//! assert_eq!(zoned.to_string(), "1979-05-27T07:32:00Z");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ErrorKind;

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// A TOML date, time or date-time.
///
/// Equality of [`Datetime::OffsetDateTime`] values compares instants, so
/// `07:32:00Z` equals `09:32:00+02:00`. A zoned value never equals a
/// floating one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datetime {
    /// A date-time with `Z` or a `±HH:MM` offset.
    OffsetDateTime(DateTime<FixedOffset>),
    /// A floating date-time: no zone was given.
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
}

impl Datetime {
    #[inline]
    #[must_use]
    pub const fn is_offset(&self) -> bool {
        matches!(self, Datetime::OffsetDateTime(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_local_date(&self) -> bool {
        matches!(self, Datetime::LocalDate(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_local_time(&self) -> bool {
        matches!(self, Datetime::LocalTime(_))
    }

    /// The calendar date, if this value has one.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(dt.date_naive()),
            Datetime::LocalDateTime(dt) => Some(dt.date()),
            Datetime::LocalDate(d) => Some(*d),
            Datetime::LocalTime(_) => None,
        }
    }

    /// The wall-clock time, if this value has one.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(dt.time()),
            Datetime::LocalDateTime(dt) => Some(dt.time()),
            Datetime::LocalDate(_) => None,
            Datetime::LocalTime(t) => Some(*t),
        }
    }

    #[must_use]
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(*dt.offset()),
            _ => None,
        }
    }

    pub(crate) fn local_date(text: &str) -> Result<Self, ErrorKind> {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Datetime::LocalDate)
            .map_err(|e| invalid(text, e))
    }

    pub(crate) fn local_datetime(text: &str) -> Result<Self, ErrorKind> {
        let text = truncate_fraction(text);
        NaiveDateTime::parse_from_str(&text, LOCAL_DATETIME_FORMAT)
            .map(Datetime::LocalDateTime)
            .map_err(|e| invalid(&text, e))
    }

    pub(crate) fn offset_datetime(text: &str) -> Result<Self, ErrorKind> {
        let text = truncate_fraction(text);
        DateTime::parse_from_rfc3339(&text)
            .map(Datetime::OffsetDateTime)
            .map_err(|e| invalid(&text, e))
    }

    pub(crate) fn local_time(text: &str) -> Result<Self, ErrorKind> {
        let text = truncate_fraction(text);
        NaiveTime::parse_from_str(&text, TIME_FORMAT)
            .map(Datetime::LocalTime)
            .map_err(|e| invalid(&text, e))
    }
}

fn invalid(text: &str, err: chrono::ParseError) -> ErrorKind {
    ErrorKind::InvalidDateTime(format!("`{}` ({})", text, err))
}

/// Drops fractional-second digits past nanosecond precision.
fn truncate_fraction(text: &str) -> String {
    let Some(dot) = text.find('.') else {
        return text.to_string();
    };
    let digits = text[dot + 1..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - dot - 1);
    if digits <= 9 {
        return text.to_string();
    }
    let keep = dot + 1 + 9;
    let rest = dot + 1 + digits;
    format!("{}{}", &text[..keep], &text[rest..])
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datetime::OffsetDateTime(dt) => {
                write!(f, "{}", dt.format(LOCAL_DATETIME_FORMAT))?;
                if dt.offset().local_minus_utc() == 0 {
                    f.write_str("Z")
                } else {
                    write!(f, "{}", dt.format("%:z"))
                }
            }
            Datetime::LocalDateTime(dt) => write!(f, "{}", dt.format(LOCAL_DATETIME_FORMAT)),
            Datetime::LocalDate(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Datetime::LocalTime(t) => write!(f, "{}", t.format(TIME_FORMAT)),
        }
    }
}

impl FromStr for Datetime {
    type Err = ErrorKind;

    /// Parses any of the four flavours, accepting `T`, `t` or a space
    /// between date and time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let has_date = s.len() >= 10 && s.as_bytes().get(4) == Some(&b'-');
        if !has_date {
            return Datetime::local_time(s);
        }
        if s.len() == 10 {
            return Datetime::local_date(s);
        }

        let mut text = s.to_string();
        if matches!(text.as_bytes().get(10), Some(b't') | Some(b' ')) {
            text.replace_range(10..11, "T");
        }
        let time = text
            .get(11..)
            .ok_or_else(|| ErrorKind::InvalidDateTime(format!("`{}` is not a date-time", s)))?;
        let zoned = time.ends_with('Z') || time.ends_with('z') || time.contains(['+', '-']);
        if zoned {
            Datetime::offset_datetime(&text)
        } else {
            Datetime::local_datetime(&text)
        }
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Datetime::OffsetDateTime(dt)
    }
}

impl From<DateTime<Utc>> for Datetime {
    fn from(dt: DateTime<Utc>) -> Self {
        Datetime::OffsetDateTime(dt.with_timezone(&Utc.fix()))
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(dt: NaiveDateTime) -> Self {
        Datetime::LocalDateTime(dt)
    }
}

impl From<NaiveDate> for Datetime {
    fn from(d: NaiveDate) -> Self {
        Datetime::LocalDate(d)
    }
}

impl From<NaiveTime> for Datetime {
    fn from(t: NaiveTime) -> Self {
        Datetime::LocalTime(t)
    }
}

/// The newtype name a [`Datetime`] serializes through. Other serializers see
/// a plain string; [`to_value`](crate::to_value) turns it back into a
/// [`Value::Datetime`](crate::Value::Datetime). Deserializing a datetime
/// through `deserialize_any` yields a one-entry map under the same key.
pub(crate) const DATETIME_NEWTYPE: &str = "$__toml_cursor_datetime";

impl Serialize for Datetime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(DATETIME_NEWTYPE, &self.to_string())
    }
}

impl<'de> Deserialize<'de> for Datetime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatetimeVisitor;

        impl<'de> Visitor<'de> for DatetimeVisitor {
            type Value = Datetime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a TOML date, time or date-time")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Datetime, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Datetime, A::Error> {
                match map.next_key::<String>()? {
                    Some(key) if key == DATETIME_NEWTYPE => {
                        let text: String = map.next_value()?;
                        text.parse().map_err(de::Error::custom)
                    }
                    _ => Err(de::Error::custom("expected a datetime")),
                }
            }
        }

        deserializer.deserialize_str(DatetimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoned_equals_epoch_instant() {
        let dt: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
        match dt {
            Datetime::OffsetDateTime(dt) => assert_eq!(dt.timestamp(), 296_638_320),
            other => panic!("expected offset datetime, got {:?}", other),
        }
    }

    #[test]
    fn test_offsets_compare_as_instants() {
        let utc: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
        let shifted: Datetime = "1979-05-27T00:32:00-07:00".parse().unwrap();
        assert_eq!(utc, shifted);
        assert_eq!(shifted.to_string(), "1979-05-27T00:32:00-07:00");
    }

    #[test]
    fn test_floating_is_not_zoned() {
        let zoned: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
        let floating: Datetime = "1979-05-27T07:32:00".parse().unwrap();
        assert!(matches!(floating, Datetime::LocalDateTime(_)));
        assert_ne!(zoned, floating);
    }

    #[test]
    fn test_separator_variants() {
        let a: Datetime = "1979-05-27 07:32:00".parse().unwrap();
        let b: Datetime = "1979-05-27t07:32:00".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1979-05-27T07:32:00");
    }

    #[test]
    fn test_display_fraction() {
        let dt: Datetime = "1979-05-27T00:32:00.999999Z".parse().unwrap();
        assert_eq!(dt.to_string(), "1979-05-27T00:32:00.999999Z");
        let t: Datetime = "07:32:00.5".parse().unwrap();
        assert_eq!(t.to_string(), "07:32:00.500");
    }

    #[test]
    fn test_local_date_and_time() {
        let d: Datetime = "0001-01-01".parse().unwrap();
        assert!(d.is_local_date());
        assert_eq!(d.to_string(), "0001-01-01");
        let t: Datetime = "00:32:00".parse().unwrap();
        assert!(t.is_local_time());
        assert_eq!(t.date(), None);
    }

    #[test]
    fn test_invalid_calendar_values() {
        assert!(matches!(
            Datetime::local_date("2021-02-30"),
            Err(ErrorKind::InvalidDateTime(_))
        ));
        assert!(Datetime::local_time("24:00:00").is_err());
        assert!(Datetime::local_datetime("2021-13-01T00:00:00").is_err());
    }

    #[test]
    fn test_multibyte_after_date_rejected() {
        assert!(matches!(
            "2024-01-01\u{e9}x".parse::<Datetime>(),
            Err(ErrorKind::InvalidDateTime(_))
        ));
        assert!(matches!(
            "2024-01-01T\u{e9}".parse::<Datetime>(),
            Err(ErrorKind::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_fraction_truncated_to_nanoseconds() {
        assert_eq!(
            truncate_fraction("00:00:00.1234567891234"),
            "00:00:00.123456789"
        );
        assert_eq!(
            truncate_fraction("1979-05-27T00:32:00.1234567891Z"),
            "1979-05-27T00:32:00.123456789Z"
        );
        assert_eq!(truncate_fraction("00:00:00.5"), "00:00:00.5");
    }

    #[test]
    fn test_serde_as_string() {
        let dt: Datetime = "1979-05-27".parse().unwrap();
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"1979-05-27\"");
        let back: Datetime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
    }
}
