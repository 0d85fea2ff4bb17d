//! Batch body parsing for `/pipeline` and `/multi-exec`.
//!
//! The body must be a JSON array of non-empty command arrays. An empty
//! outer array is valid and yields an empty result sequence.

use serde_json::{json, Value as JsonValue};

use redbridge_common::{Command, CommandResult, Error, Result};

use crate::command::stringify;
use crate::encoding::{format_reply, EncodeOptions};

/// Parse a batch request body into ordered commands.
pub fn parse_batch(body: &[u8]) -> Result<Vec<Command>> {
    let parsed: JsonValue =
        serde_json::from_slice(body).map_err(|_| Error::MalformedBatch)?;
    let JsonValue::Array(entries) = parsed else {
        return Err(Error::MalformedBatch);
    };
    entries.iter().map(command_from_entry).collect()
}

/// Map execution results onto the response array, one JSON object per
/// command in submission order.
#[must_use]
pub fn results_to_json(results: Vec<CommandResult>, opts: &EncodeOptions) -> Vec<JsonValue> {
    results
        .into_iter()
        .map(|result| match result.error {
            Some(message) => json!({ "error": message }),
            None => json!({ "result": format_reply(result.value, opts) }),
        })
        .collect()
}

fn command_from_entry(entry: &JsonValue) -> Result<Command> {
    let Some(parts) = entry.as_array() else {
        return Err(Error::MalformedBatch);
    };
    let Some(first) = parts.first() else {
        return Err(Error::MalformedBatch);
    };
    let name = stringify(first);
    if name.is_empty() {
        return Err(Error::MalformedBatch);
    }
    let args = parts[1..].iter().map(stringify).collect();
    Ok(Command::new(name, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redbridge_common::ReplyValue;

    #[test]
    fn test_parse_valid_batch() {
        let commands = parse_batch(br#"[["set","foo","bar"],["get","foo"]]"#).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], Command::new("set", vec!["foo".into(), "bar".into()]));
        assert_eq!(commands[1], Command::new("get", vec!["foo".into()]));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert!(parse_batch(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_batch_elements_are_stringified() {
        let commands = parse_batch(br#"[["setex","k",60,"v"]]"#).unwrap();
        assert_eq!(commands[0].args, vec!["k", "60", "v"]);
    }

    #[test]
    fn test_rejects_non_array_body() {
        assert!(matches!(
            parse_batch(br#"{"set":"foo"}"#).unwrap_err(),
            Error::MalformedBatch
        ));
        assert!(matches!(parse_batch(b"not json").unwrap_err(), Error::MalformedBatch));
    }

    #[test]
    fn test_rejects_non_array_elements() {
        assert!(matches!(
            parse_batch(br#"["set","foo"]"#).unwrap_err(),
            Error::MalformedBatch
        ));
    }

    #[test]
    fn test_rejects_empty_command_array() {
        assert!(matches!(parse_batch(b"[[]]").unwrap_err(), Error::MalformedBatch));
    }

    #[test]
    fn test_results_keep_order_and_shape() {
        let results = vec![
            CommandResult::ok(ReplyValue::Str("OK".into())),
            CommandResult::err("ERR wrong type"),
            CommandResult::ok(ReplyValue::Null),
        ];
        let json = results_to_json(results, &EncodeOptions::default());
        assert_eq!(json[0], json!({ "result": "OK" }));
        assert_eq!(json[1], json!({ "error": "ERR wrong type" }));
        assert_eq!(json[2], json!({ "result": null }));
    }
}
