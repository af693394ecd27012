use crate::domain::coerce::Coerce;
use crate::domain::error::ParseError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Opaque instant exchanged as the host's `time.Time`.
///
/// The offset the host wrote is kept, so a value read from the bridge is
/// written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Calendar day in the offset the timestamp was written with.
    pub fn date_naive(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// RFC 3339 with `Z` for a zero offset, the way the host writes it.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(dt));
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Self(Utc.from_utc_datetime(&midnight).fixed_offset()))
    }

    fn from_millis(ms: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(ms).and_then(Self::four_digit_year)
    }

    fn from_parts(seconds: i64, nanos: u32) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(seconds, nanos).and_then(Self::four_digit_year)
    }

    /// RFC 3339 only has room for years 0000 through 9999.
    fn four_digit_year(dt: DateTime<Utc>) -> Option<Self> {
        (0..=9999)
            .contains(&dt.year())
            .then(|| Self(dt.fixed_offset()))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Coerce for Timestamp {
    fn coerce(value: &Value) -> Result<Self, ParseError> {
        let parsed = match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(Self::from_millis),
            Value::Object(map) => {
                let seconds = map.get("seconds").and_then(Value::as_i64);
                let nanos = map
                    .get("nanos")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0);
                seconds.and_then(|s| Self::from_parts(s, nanos))
            }
            _ => None,
        };
        parsed.ok_or_else(|| ParseError::field("timestamp", format!("unreadable timestamp: {value}")))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::coerce(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_rfc3339_and_keeps_offset() {
        let ts = Timestamp::coerce(&json!("2024-03-01T09:30:00-05:00")).unwrap();
        assert_eq!(ts.to_string(), "2024-03-01T09:30:00-05:00");
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn reads_plain_date_as_utc_midnight() {
        let ts = Timestamp::coerce(&json!("2024-01-01")).unwrap();
        assert_eq!(ts.to_utc(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn reads_epoch_millis_and_seconds_object() {
        let a = Timestamp::coerce(&json!(1_704_067_200_000_i64)).unwrap();
        let b = Timestamp::coerce(&json!({"seconds": 1_704_067_200_i64, "nanos": 0})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_utc(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn coercion_is_idempotent() {
        let once = Timestamp::coerce(&json!("2024-01-01T00:00:00Z")).unwrap();
        let twice = Timestamp::coerce(&serde_json::to_value(once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn numeric_input_outside_four_digit_years_is_rejected() {
        let year_10000 = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let year_minus_1 = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();

        assert!(Timestamp::coerce(&json!(year_10000.timestamp_millis())).is_err());
        assert!(Timestamp::coerce(&json!(year_minus_1.timestamp_millis())).is_err());
        assert!(Timestamp::coerce(&json!({"seconds": year_10000.timestamp()})).is_err());
        assert!(Timestamp::coerce(&json!({"seconds": year_minus_1.timestamp()})).is_err());
    }

    #[test]
    fn last_and_first_representable_instants_round_trip() {
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let go_zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        for ms in [last.timestamp_millis(), go_zero.timestamp_millis()] {
            let once = Timestamp::coerce(&json!(ms)).unwrap();
            let twice = Timestamp::coerce(&serde_json::to_value(once).unwrap()).unwrap();
            assert_eq!(once, twice);
        }
        assert_eq!(
            Timestamp::coerce(&json!(go_zero.timestamp_millis())).unwrap().to_string(),
            "0001-01-01T00:00:00Z"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::coerce(&json!("yesterday")).is_err());
        assert!(Timestamp::coerce(&json!(true)).is_err());
        assert!(Timestamp::coerce(&json!({"nanos": 5})).is_err());
    }
}
