use crate::domain::error::ParseError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds a typed value from one raw JSON value.
pub trait Coerce: Sized {
    fn coerce(value: &Value) -> Result<Self, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Objects are a single nested value.
    #[default]
    Value,
    /// Objects are maps whose values are each coerced.
    Map,
}

/// Result of [`convert_values`], shaped like the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Absent,
    One(T),
    Many(Vec<Nested<T>>),
    Keyed(BTreeMap<String, T>),
}

impl<T> Nested<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nested::Absent)
    }

    /// The single value, if the input was neither a sequence nor a map.
    pub fn into_one(self) -> Option<T> {
        match self {
            Nested::One(v) => Some(v),
            _ => None,
        }
    }

    /// Depth-first flattening: sequences in order, maps in key order.
    pub fn into_flat(self) -> Vec<T> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<T>) {
        match self {
            Nested::Absent => {}
            Nested::One(v) => out.push(v),
            Nested::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            Nested::Keyed(map) => out.extend(map.into_values()),
        }
    }
}

impl<T: Serialize> Serialize for Nested<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nested::Absent => serializer.serialize_none(),
            Nested::One(v) => v.serialize(serializer),
            Nested::Many(items) => items.serialize(serializer),
            Nested::Keyed(map) => map.serialize(serializer),
        }
    }
}

/// Coerces `value` into `T` following its runtime shape.
///
/// `null` stays absent, arrays are coerced element by element (order kept,
/// nested arrays recurse in value mode), objects are treated as a map of `T`
/// only in [`Mode::Map`], and anything else is handed to [`Coerce::coerce`].
pub fn convert_values<T: Coerce>(value: &Value, mode: Mode) -> Result<Nested<T>, ParseError> {
    match value {
        Value::Null => Ok(Nested::Absent),
        Value::Array(items) => items
            .iter()
            .map(|item| convert_values(item, Mode::Value))
            .collect::<Result<Vec<_>, _>>()
            .map(Nested::Many),
        Value::Object(map) if mode == Mode::Map => {
            let mut out = BTreeMap::new();
            for (key, item) in map {
                out.insert(key.clone(), T::coerce(item)?);
            }
            Ok(Nested::Keyed(out))
        }
        other => T::coerce(other).map(Nested::One),
    }
}

/// Decodes a bridge list response: `null` is an empty list.
pub fn convert_list<T: Coerce>(value: &Value) -> Result<Vec<T>, ParseError> {
    Ok(convert_values::<T>(value, Mode::Value)?.into_flat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::Timestamp;
    use serde_json::json;

    #[test]
    fn sequences_keep_order() {
        let raw = json!(["2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z"]);
        let out = convert_values::<Timestamp>(&raw, Mode::Value).unwrap();
        let flat = out.into_flat();
        assert_eq!(flat.len(), 2);
        assert!(flat[0] > flat[1]);
    }

    #[test]
    fn map_mode_keeps_keys() {
        let raw = json!({"open": "2024-01-01T00:00:00Z", "close": "2024-01-05T00:00:00Z"});
        let out = convert_values::<Timestamp>(&raw, Mode::Map).unwrap();
        let Nested::Keyed(map) = out else {
            panic!("expected keyed output");
        };
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("open"));
        assert!(map.contains_key("close"));
    }

    #[test]
    fn object_in_value_mode_is_one_nested_value() {
        let raw = json!({"seconds": 0, "nanos": 0});
        let out = convert_values::<Timestamp>(&raw, Mode::Value).unwrap();
        assert!(matches!(out, Nested::One(_)));
    }

    #[test]
    fn null_is_absent_and_lists_flatten_to_empty() {
        assert!(convert_values::<Timestamp>(&Value::Null, Mode::Value)
            .unwrap()
            .is_absent());
        assert!(convert_list::<Timestamp>(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn converting_converted_output_is_stable() {
        let raw = json!([["2024-01-01T00:00:00Z"], 1_704_067_200_000_i64]);
        let once = convert_values::<Timestamp>(&raw, Mode::Value).unwrap();
        let again =
            convert_values::<Timestamp>(&serde_json::to_value(&once).unwrap(), Mode::Value).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn bad_element_fails_the_whole_sequence() {
        let raw = json!(["2024-01-01T00:00:00Z", false]);
        assert!(convert_values::<Timestamp>(&raw, Mode::Value).is_err());
    }
}
