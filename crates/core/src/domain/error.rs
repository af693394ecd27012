use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// String input that is not JSON at all.
    InvalidJson,
    /// JSON that parsed but is neither an object nor null.
    NotAnObject,
    /// A declared field holds a value of the wrong JSON type.
    Field { field: String },
}

/// Failure to build a record from raw bridge input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub record: &'static str,
    pub kind: ParseErrorKind,
    pub detail: String,
}

impl ParseError {
    pub fn invalid_json(record: &'static str, detail: impl Into<String>) -> Self {
        Self {
            record,
            kind: ParseErrorKind::InvalidJson,
            detail: detail.into(),
        }
    }

    pub fn not_an_object(record: &'static str, found: &serde_json::Value) -> Self {
        Self {
            record,
            kind: ParseErrorKind::NotAnObject,
            detail: format!("expected a JSON object, got {}", json_kind(found)),
        }
    }

    pub fn field(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            record: "",
            kind: ParseErrorKind::Field {
                field: field.into(),
            },
            detail: detail.into(),
        }
    }

    pub(crate) fn in_record(mut self, record: &'static str) -> Self {
        if self.record.is_empty() {
            self.record = record;
        }
        self
    }

    pub fn field_name(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::Field { field } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = if self.record.is_empty() {
            "value"
        } else {
            self.record
        };
        match &self.kind {
            ParseErrorKind::InvalidJson => write!(f, "{record}: invalid JSON: {}", self.detail),
            ParseErrorKind::NotAnObject => write!(f, "{record}: {}", self.detail),
            ParseErrorKind::Field { field } => {
                write!(f, "{record}.{field}: {}", self.detail)
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
