use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /call` and `POST /runtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Host reply. A reply with neither field set is a successful `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Success flag of a write call. Host methods that only return an error
/// answer `null` on success.
pub fn success_flag(result: &Value) -> anyhow::Result<bool> {
    match result {
        Value::Null => Ok(true),
        Value::Bool(b) => Ok(*b),
        other => anyhow::bail!("expected a boolean success flag, got {other}"),
    }
}
