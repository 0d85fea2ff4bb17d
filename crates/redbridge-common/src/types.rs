//! Domain types exchanged between the gateway and the store client.
//!
//! `ReplyValue` is the canonical reply representation: an explicit tagged
//! union with one case per shape the store can produce. Every transform in
//! the gateway (JSON embedding, Base64 encoding, RESP2 serialization) is a
//! total function over this union.

use serde::{Deserialize, Serialize};

/// A single store command: name plus positional arguments.
///
/// Argument order is significant and preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command name, e.g. `GET` or `set`. Never empty.
    pub name: String,
    /// Positional arguments, already stringified.
    pub args: Vec<String>,
}

impl Command {
    /// Create a new command
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// How a batch of commands is submitted to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// One round trip, no cross-command atomicity
    Pipeline,
    /// MULTI/EXEC; atomicity delegated to the store
    Transaction,
}

impl BatchMode {
    /// Lowercase mode name for logging
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchMode::Pipeline => "pipeline",
            BatchMode::Transaction => "transaction",
        }
    }
}

/// Per-command outcome of a batch execution.
///
/// Exactly one of `error`/`value` is meaningful; order in the surrounding
/// sequence matches submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// Error message from the store, if the command failed
    pub error: Option<String>,
    /// Reply value, if the command succeeded
    pub value: ReplyValue,
}

impl CommandResult {
    /// Successful result carrying a reply value
    #[must_use]
    pub fn ok(value: ReplyValue) -> Self {
        Self { error: None, value }
    }

    /// Failed result carrying the store's error message
    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            value: ReplyValue::Null,
        }
    }
}

/// Universal reply value produced by the store client.
///
/// Mappings keep their pairs in the order the client yielded them, so
/// flattening into an alternating key/value sequence is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyValue {
    /// Nil reply or missing value
    Null,
    /// Boolean reply
    Bool(bool),
    /// Integer reply
    Int(i64),
    /// Double reply (typed store paths only; RESP2 has no double type)
    Double(f64),
    /// UTF-8 string reply
    Str(String),
    /// Binary reply that is not valid UTF-8
    Bytes(Vec<u8>),
    /// Error reply embedded in a result set
    Error(String),
    /// Array reply
    Array(Vec<ReplyValue>),
    /// Map reply, order-preserving
    Map(Vec<(String, ReplyValue)>),
}

impl ReplyValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ReplyValue::Null)
    }

    /// Try to get as string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReplyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as array
    #[must_use]
    pub fn as_array(&self) -> Option<&[ReplyValue]> {
        match self {
            ReplyValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the shape name for error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ReplyValue::Null => "null",
            ReplyValue::Bool(_) => "boolean",
            ReplyValue::Int(_) => "integer",
            ReplyValue::Double(_) => "double",
            ReplyValue::Str(_) => "string",
            ReplyValue::Bytes(_) => "bytes",
            ReplyValue::Error(_) => "error",
            ReplyValue::Array(_) => "array",
            ReplyValue::Map(_) => "map",
        }
    }
}

impl Default for ReplyValue {
    fn default() -> Self {
        ReplyValue::Null
    }
}

impl From<&str> for ReplyValue {
    fn from(v: &str) -> Self {
        ReplyValue::Str(v.to_string())
    }
}

impl From<String> for ReplyValue {
    fn from(v: String) -> Self {
        ReplyValue::Str(v)
    }
}

impl From<i64> for ReplyValue {
    fn from(v: i64) -> Self {
        ReplyValue::Int(v)
    }
}

impl From<bool> for ReplyValue {
    fn from(v: bool) -> Self {
        ReplyValue::Bool(v)
    }
}

impl<T: Into<ReplyValue>> From<Vec<T>> for ReplyValue {
    fn from(v: Vec<T>) -> Self {
        ReplyValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<ReplyValue> for serde_json::Value {
    fn from(v: ReplyValue) -> Self {
        match v {
            ReplyValue::Null => serde_json::Value::Null,
            ReplyValue::Bool(b) => serde_json::Value::Bool(b),
            ReplyValue::Int(i) => serde_json::Value::Number(i.into()),
            ReplyValue::Double(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ReplyValue::Str(s) => serde_json::Value::String(s),
            // Binary replies are only JSON-safe lossily; clients that care
            // request the Base64 encoding header instead.
            ReplyValue::Bytes(b) => {
                serde_json::Value::String(String::from_utf8_lossy(&b).into_owned())
            }
            ReplyValue::Error(msg) => serde_json::Value::String(msg),
            ReplyValue::Array(a) => {
                serde_json::Value::Array(a.into_iter().map(Into::into).collect())
            }
            ReplyValue::Map(pairs) => serde_json::Value::Object(
                pairs.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_from_primitives() {
        assert_eq!(ReplyValue::from("hi"), ReplyValue::Str("hi".to_string()));
        assert_eq!(ReplyValue::from(42i64), ReplyValue::Int(42));
        assert_eq!(ReplyValue::from(true), ReplyValue::Bool(true));
        assert_eq!(
            ReplyValue::from(vec!["a", "b"]),
            ReplyValue::Array(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_reply_type_checks() {
        assert!(ReplyValue::Null.is_null());
        assert_eq!(ReplyValue::Str("x".into()).as_str(), Some("x"));
        assert_eq!(ReplyValue::Int(1).as_str(), None);
        assert_eq!(ReplyValue::Bytes(vec![0xff]).type_name(), "bytes");
    }

    #[test]
    fn test_reply_json_conversion() {
        let value = ReplyValue::Array(vec![
            ReplyValue::Null,
            ReplyValue::Int(7),
            ReplyValue::Str("ok".into()),
            ReplyValue::Bool(false),
        ]);
        let json: serde_json::Value = value.into();
        assert_eq!(json, serde_json::json!([null, 7, "ok", false]));
    }

    #[test]
    fn test_map_json_conversion() {
        let value = ReplyValue::Map(vec![
            ("field".to_string(), ReplyValue::Str("hello".into())),
            ("count".to_string(), ReplyValue::Int(1)),
        ]);
        let json: serde_json::Value = value.into();
        assert_eq!(json["field"], serde_json::json!("hello"));
        assert_eq!(json["count"], serde_json::json!(1));
    }

    #[test]
    fn test_command_result_helpers() {
        let ok = CommandResult::ok(ReplyValue::Str("OK".into()));
        assert!(ok.error.is_none());

        let err = CommandResult::err("ERR wrong number of arguments");
        assert_eq!(err.error.as_deref(), Some("ERR wrong number of arguments"));
        assert!(err.value.is_null());
    }
}
