use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, RpcError};

/// Decodes a raw result as a u64.
///
/// Ethereum nodes answer quantity queries with hex strings (`"0x1b4"`); some
/// endpoints return plain number literals or decimal strings, and all three
/// forms are accepted.
pub fn read_u64(v: &Value) -> Result<u64> {
    match v {
        Value::String(s) => parse_u64(s),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| RpcError::InvalidValue(n.to_string())),
        other => Err(RpcError::InvalidValue(other.to_string())),
    }
}

fn parse_u64(s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| RpcError::InvalidValue(s.to_string()))
}

/// Decodes a raw result as a string.
pub fn read_string(v: &Value) -> Result<String> {
    v.as_str()
        .map(str::to_owned)
        .ok_or_else(|| RpcError::InvalidValue(v.to_string()))
}

/// Decodes a raw result into any deserializable target.
///
/// This is the deferred half of the call contract: the envelope hands back
/// uninterpreted JSON and the caller picks the shape.
pub fn read_as<T: DeserializeOwned>(v: Value) -> Result<T> {
    Ok(serde_json::from_value(v)?)
}
