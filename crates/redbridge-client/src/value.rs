//! Conversion from the store client's reply representation into
//! [`ReplyValue`].

use fred::types::RedisValue;

use redbridge_common::ReplyValue;

/// Convert a raw client reply into the gateway's canonical value.
///
/// Total over every reply shape; unknown future variants degrade to null
/// rather than failing the request.
pub fn from_redis_value(value: RedisValue) -> ReplyValue {
    match value {
        RedisValue::Null => ReplyValue::Null,
        RedisValue::Boolean(b) => ReplyValue::Bool(b),
        RedisValue::Integer(i) => ReplyValue::Int(i),
        RedisValue::Double(f) => ReplyValue::Double(f),
        RedisValue::String(s) => ReplyValue::Str(s.to_string()),
        RedisValue::Bytes(b) => ReplyValue::Bytes(b.to_vec()),
        RedisValue::Queued => ReplyValue::Str("QUEUED".to_string()),
        RedisValue::Array(items) => {
            ReplyValue::Array(items.into_iter().map(from_redis_value).collect())
        }
        RedisValue::Map(map) => ReplyValue::Map(
            map.inner()
                .into_iter()
                .map(|(key, value)| {
                    (
                        String::from_utf8_lossy(key.as_bytes()).into_owned(),
                        from_redis_value(value),
                    )
                })
                .collect(),
        ),
        _ => ReplyValue::Null,
    }
}
