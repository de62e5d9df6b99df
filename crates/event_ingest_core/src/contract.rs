use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Source label stamped on every audit row.
pub const AUDIT_SOURCE: &str = "github-actions";
pub const SUMMARY_STATUS_OK: &str = "ok";

/// Queue-trigger invocation input. A missing `Records` field is an empty batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<BatchRecord>,
}

/// One queued message. Only `body` is read; other trigger metadata is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchRecord {
    #[serde(default)]
    pub body: Value,
}

impl BatchRecord {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: Value::String(body.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub status: String,
    pub processed: usize,
}

impl BatchSummary {
    pub fn ok(processed: usize) -> Self {
        Self {
            status: SUMMARY_STATUS_OK.to_string(),
            processed,
        }
    }
}

/// Outcome of decoding a record body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyParse {
    Parsed(Value),
    /// Body was not a JSON string or did not parse; `raw` is the body as delivered.
    Malformed { raw: Value },
}

impl BodyParse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn into_payload(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Malformed { raw } => json!({ "raw": raw }),
        }
    }
}

pub fn parse_record_body(body: &Value) -> BodyParse {
    match body {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => BodyParse::Parsed(value),
            Err(_) => BodyParse::Malformed { raw: body.clone() },
        },
        _ => BodyParse::Malformed { raw: body.clone() },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRow {
    pub source: String,
    pub event_type: Option<String>,
    pub payload: Value,
}

impl AuditRow {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            source: AUDIT_SOURCE.to_string(),
            event_type: event_type(payload),
            payload: payload.clone(),
        }
    }
}

/// Reads the `event` field of an object payload. Strings are taken as-is,
/// other non-null values are kept as their JSON text.
pub fn event_type(payload: &Value) -> Option<String> {
    match payload.as_object()?.get("event")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
