use crate::domain::coerce::{convert_values, Mode, Nested};
use crate::domain::error::{json_kind, ParseError};
use crate::domain::timestamp::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};

/// Raw input accepted by record constructors.
#[derive(Debug, Clone, Default)]
pub enum Source {
    #[default]
    Absent,
    Json(Value),
    Text(String),
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Source::Json(value)
    }
}

impl From<&Value> for Source {
    fn from(value: &Value) -> Self {
        Source::Json(value.clone())
    }
}

impl From<Option<Value>> for Source {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Source::Absent, Source::Json)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

/// A named-field value exchanged across the bridge.
///
/// Every field is optional: missing or `null` input fields stay absent and
/// fields the record does not declare are dropped.
pub trait Record: Sized + Default + Serialize {
    const KIND: &'static str;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, ParseError>;

    /// Builds a record from an object, a JSON-encoded string, or nothing.
    fn create_from(source: impl Into<Source>) -> Result<Self, ParseError> {
        match source.into() {
            Source::Absent => Ok(Self::default()),
            Source::Json(value) => decode(&value),
            Source::Text(text) => decode_text(&text),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub(crate) fn decode<T: Record>(value: &Value) -> Result<T, ParseError> {
    match value {
        Value::Null => Ok(T::default()),
        Value::String(text) => decode_text(text),
        Value::Object(map) => decode_object(map),
        other => Err(ParseError::not_an_object(T::KIND, other)),
    }
}

fn decode_text<T: Record>(text: &str) -> Result<T, ParseError> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|err| ParseError::invalid_json(T::KIND, err.to_string()))?;
    match &value {
        Value::Null => Ok(T::default()),
        Value::Object(map) => decode_object(map),
        other => Err(ParseError::not_an_object(T::KIND, other)),
    }
}

fn decode_object<T: Record>(map: &Map<String, Value>) -> Result<T, ParseError> {
    T::from_fields(&Fields { map }).map_err(|err| err.in_record(T::KIND))
}

/// Field-by-field reader over one input object.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn present(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    pub fn string(&self, name: &str) -> Result<Option<String>, ParseError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(name, "string", other)),
        }
    }

    pub fn number(&self, name: &str) -> Result<Option<f64>, ParseError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(mismatch(name, "number", other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<Option<i64>, ParseError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                    _ => Err(ParseError::field(name, format!("expected an integer, got {n}"))),
                },
            },
            Some(other) => Err(mismatch(name, "integer", other)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>, ParseError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(name, "boolean", other)),
        }
    }

    /// Timestamp fields go through the shared coercion step.
    pub fn timestamp(&self, name: &str) -> Result<Option<Timestamp>, ParseError> {
        let Some(value) = self.present(name) else {
            return Ok(None);
        };
        if matches!(value, Value::String(s) if s.trim().is_empty()) {
            return Ok(None);
        }
        let nested = convert_values::<Timestamp>(value, Mode::Value)
            .map_err(|err| ParseError::field(name, err.detail))?;
        match nested {
            Nested::Absent => Ok(None),
            Nested::One(ts) => Ok(Some(ts)),
            Nested::Many(_) | Nested::Keyed(_) => Err(ParseError::field(
                name,
                format!("expected a single timestamp, got {}", json_kind(value)),
            )),
        }
    }
}

fn mismatch(name: &str, expected: &str, found: &Value) -> ParseError {
    ParseError::field(
        name,
        format!("expected {expected}, got {}", json_kind(found)),
    )
}

/// `Coerce` and `Deserialize` for a [`Record`], both routed through
/// [`Record::create_from`].
macro_rules! record_impls {
    ($ty:ty) => {
        impl $crate::domain::coerce::Coerce for $ty {
            fn coerce(
                value: &serde_json::Value,
            ) -> Result<Self, $crate::domain::error::ParseError> {
                $crate::domain::record::decode(value)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                $crate::domain::record::decode(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use record_impls;
