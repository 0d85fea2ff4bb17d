//! Response Formatter: store reply to JSON-embeddable form.
//!
//! Two optional transforms, each driven by its own request header and
//! checked in a fixed order: RESP2 textual serialization first, then
//! recursive Base64. Top-level mapping replies are flattened into an
//! alternating key/value array before either transform runs, mirroring
//! how the store presents field/value replies over its own wire format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::HeaderMap;

use redbridge_common::ReplyValue;

/// Header enabling recursive Base64 encoding when set to `base64`.
pub const ENCODING_HEADER: &str = "upstash-encoding";
/// Header enabling RESP2 textual serialization when set to `resp2`.
pub const RESPONSE_FORMAT_HEADER: &str = "upstash-response-format";

/// Requested reply encodings, read once per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// RESP2 textual serialization requested
    pub resp2: bool,
    /// Recursive Base64 encoding requested
    pub base64: bool,
}

impl EncodeOptions {
    /// Read the formatting headers from a request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants = |name: &str, value: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().eq_ignore_ascii_case(value))
                .unwrap_or(false)
        };
        Self {
            resp2: wants(RESPONSE_FORMAT_HEADER, "resp2"),
            base64: wants(ENCODING_HEADER, "base64"),
        }
    }
}

/// Convert a store reply into the JSON value embedded under `result`.
///
/// RESP2 takes precedence over Base64 when both headers are present; it
/// is evaluated first, a compatibility detail of the original wire
/// behavior rather than a deliberate ranking.
#[must_use]
pub fn format_reply(value: ReplyValue, opts: &EncodeOptions) -> serde_json::Value {
    let value = flatten_top_level_map(value);
    if opts.resp2 {
        return serde_json::Value::String(resp2_encode(&value));
    }
    if opts.base64 {
        return encode_base64_values(value).into();
    }
    value.into()
}

/// Top-level mapping replies become an alternating key/value array.
fn flatten_top_level_map(value: ReplyValue) -> ReplyValue {
    match value {
        ReplyValue::Map(pairs) => ReplyValue::Array(
            pairs
                .into_iter()
                .flat_map(|(key, value)| [ReplyValue::Str(key), value])
                .collect(),
        ),
        other => other,
    }
}

/// Serialize a reply in RESP2 textual form.
#[must_use]
pub fn resp2_encode(value: &ReplyValue) -> String {
    match value {
        ReplyValue::Null => "$-1\r\n".to_string(),
        ReplyValue::Bool(b) => format!(":{}\r\n", i32::from(*b)),
        ReplyValue::Int(i) => format!(":{i}\r\n"),
        ReplyValue::Double(f) => format!(":{f}\r\n"),
        ReplyValue::Error(message) => format!("-ERR {message}\r\n"),
        ReplyValue::Bytes(bytes) => format!(
            "${}\r\n{}\r\n",
            bytes.len(),
            String::from_utf8_lossy(bytes)
        ),
        ReplyValue::Str(s) if s == "OK" => "+OK\r\n".to_string(),
        ReplyValue::Str(s) => format!("${}\r\n{s}\r\n", s.len()),
        ReplyValue::Array(items) => {
            let mut out = format!("*{}\r\n", items.len());
            for item in items {
                out.push_str(&resp2_encode(item));
            }
            out
        }
        // Nested maps (RESP3-only shapes) serialize as their flattened
        // array form.
        ReplyValue::Map(pairs) => {
            let mut out = format!("*{}\r\n", pairs.len() * 2);
            for (key, value) in pairs {
                out.push_str(&resp2_encode(&ReplyValue::Str(key.clone())));
                out.push_str(&resp2_encode(value));
            }
            out
        }
    }
}

/// Recursively Base64-encode string and byte leaves.
///
/// The literal status string `OK` stays as-is so success replies remain
/// recognizable; every other string leaf becomes the Base64 of its UTF-8
/// bytes, and byte leaves are encoded likewise.
#[must_use]
pub fn encode_base64_values(value: ReplyValue) -> ReplyValue {
    match value {
        ReplyValue::Str(s) if s == "OK" => ReplyValue::Str(s),
        ReplyValue::Str(s) => ReplyValue::Str(STANDARD.encode(s.as_bytes())),
        ReplyValue::Bytes(bytes) => ReplyValue::Str(STANDARD.encode(bytes)),
        ReplyValue::Array(items) => {
            ReplyValue::Array(items.into_iter().map(encode_base64_values).collect())
        }
        ReplyValue::Map(pairs) => ReplyValue::Map(
            pairs
                .into_iter()
                .map(|(key, value)| (key, encode_base64_values(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_resp2_fixtures() {
        assert_eq!(resp2_encode(&ReplyValue::Null), "$-1\r\n");
        assert_eq!(resp2_encode(&ReplyValue::Bool(true)), ":1\r\n");
        assert_eq!(resp2_encode(&ReplyValue::Bool(false)), ":0\r\n");
        assert_eq!(resp2_encode(&ReplyValue::Int(123)), ":123\r\n");
        assert_eq!(resp2_encode(&ReplyValue::Str("OK".into())), "+OK\r\n");
        assert_eq!(
            resp2_encode(&ReplyValue::Str("Hello".into())),
            "$5\r\nHello\r\n"
        );
        assert_eq!(
            resp2_encode(&ReplyValue::Array(vec!["Hello".into(), "World".into()])),
            "*2\r\n$5\r\nHello\r\n$5\r\nWorld\r\n"
        );
    }

    #[test]
    fn test_resp2_error_and_bytes() {
        assert_eq!(
            resp2_encode(&ReplyValue::Error("bad thing".into())),
            "-ERR bad thing\r\n"
        );
        assert_eq!(
            resp2_encode(&ReplyValue::Bytes(b"ab".to_vec())),
            "$2\r\nab\r\n"
        );
    }

    #[test]
    fn test_resp2_string_length_is_utf8_bytes() {
        assert_eq!(
            resp2_encode(&ReplyValue::Str("héllo".into())),
            "$6\r\nhéllo\r\n"
        );
    }

    #[test]
    fn test_base64_spares_ok() {
        assert_eq!(
            encode_base64_values(ReplyValue::Str("OK".into())),
            ReplyValue::Str("OK".into())
        );
    }

    #[test]
    fn test_base64_encodes_string_leaves() {
        assert_eq!(
            encode_base64_values(ReplyValue::Str("hello".into())),
            ReplyValue::Str("aGVsbG8=".into())
        );
    }

    #[test]
    fn test_base64_recurses_and_passes_scalars_through() {
        let value = ReplyValue::Array(vec![
            ReplyValue::Str("hello".into()),
            ReplyValue::Str("OK".into()),
            ReplyValue::Int(5),
            ReplyValue::Null,
            ReplyValue::Map(vec![("k".into(), ReplyValue::Str("hello".into()))]),
        ]);
        assert_eq!(
            encode_base64_values(value),
            ReplyValue::Array(vec![
                ReplyValue::Str("aGVsbG8=".into()),
                ReplyValue::Str("OK".into()),
                ReplyValue::Int(5),
                ReplyValue::Null,
                ReplyValue::Map(vec![("k".into(), ReplyValue::Str("aGVsbG8=".into()))]),
            ])
        );
    }

    #[test]
    fn test_top_level_map_is_flattened() {
        let value = ReplyValue::Map(vec![
            ("field".into(), ReplyValue::Str("value".into())),
            ("n".into(), ReplyValue::Int(2)),
        ]);
        let json = format_reply(value, &EncodeOptions::default());
        assert_eq!(json, serde_json::json!(["field", "value", "n", 2]));
    }

    #[test]
    fn test_resp2_takes_precedence_over_base64() {
        let opts = EncodeOptions {
            resp2: true,
            base64: true,
        };
        let json = format_reply(ReplyValue::Str("Hello".into()), &opts);
        assert_eq!(json, serde_json::json!("$5\r\nHello\r\n"));
    }

    #[test]
    fn test_options_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ENCODING_HEADER, HeaderValue::from_static("base64"));
        let opts = EncodeOptions::from_headers(&headers);
        assert!(opts.base64);
        assert!(!opts.resp2);

        headers.insert(
            RESPONSE_FORMAT_HEADER,
            HeaderValue::from_static("RESP2"),
        );
        let opts = EncodeOptions::from_headers(&headers);
        assert!(opts.resp2);

        headers.insert(ENCODING_HEADER, HeaderValue::from_static("hex"));
        assert!(!EncodeOptions::from_headers(&headers).base64);
    }
}
