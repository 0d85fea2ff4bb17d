//! Command Builder: one HTTP request in, one store command out.
//!
//! Precedence is body over path: a flat JSON array body always wins; the
//! URL path is only consulted when the body is absent, blank, or not an
//! array. Query-string pairs (minus the auth parameter) are appended as
//! trailing arguments in either case, preserving iteration order.

use http::Method;
use percent_encoding::percent_decode_str;
use serde_json::Value as JsonValue;

use redbridge_common::{Command, Error, Result};

/// Query parameter carrying the auth token; never forwarded to the store.
pub const TOKEN_QUERY_PARAM: &str = "_token";

/// Build a single command from the request parts.
pub fn build_command(
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &[u8],
) -> Result<Command> {
    let trailing = query_args(query);

    if body_bearing(method) {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if !text.is_empty() {
            let parsed: JsonValue =
                serde_json::from_str(text).map_err(|_| Error::BodyNotJson)?;
            if let JsonValue::Array(items) = parsed {
                return command_from_array(items, trailing);
            }
            // Non-array JSON bodies carry no command; the path rules apply.
        }
    }

    command_from_path(path, trailing)
}

/// Stringify a JSON value positionally: strings pass through, everything
/// else becomes its compact JSON text.
pub(crate) fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn body_bearing(method: &Method) -> bool {
    *method == Method::POST
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::DELETE
}

fn command_from_array(items: Vec<JsonValue>, trailing: Vec<String>) -> Result<Command> {
    if matches!(items.first(), Some(JsonValue::Array(_))) {
        // Batch input sent to the single-command path.
        return Err(Error::BatchNotAllowed);
    }

    let mut items = items.into_iter();
    let name = match items.next() {
        None => return Err(Error::NoCommand),
        Some(JsonValue::String(s)) if !s.is_empty() => s,
        Some(_) => return Err(Error::InvalidCommandName),
    };

    let mut args: Vec<String> = items.map(|item| stringify(&item)).collect();
    args.extend(trailing);
    Ok(Command::new(name, args))
}

fn command_from_path(path: &str, trailing: Vec<String>) -> Result<Command> {
    let mut segments = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned());

    let name = segments.next().ok_or(Error::NoCommand)?;
    let mut args: Vec<String> = segments.collect();
    args.extend(trailing);
    Ok(Command::new(name, args))
}

/// Collect query pairs into a flat trailing-argument list, skipping the
/// auth parameter. A valueless key contributes the bare key, so
/// flag-style options such as `?NX` work from the URL.
fn query_args(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    let mut args = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == TOKEN_QUERY_PARAM {
            continue;
        }
        args.push(key.into_owned());
        if !value.is_empty() {
            args.push(value.into_owned());
        }
    }
    args
}
