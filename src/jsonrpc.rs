use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monotonic request id generator. Each client owns its own sequence, so ids
/// are unique within a client rather than shared through process-global state.
#[derive(Debug, Default)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Builds a positional-parameter request. Empty params encode as `[]`,
    /// never `null`, which strict servers reject.
    pub fn new(method: &str, params: Vec<Value>, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: Value::Array(params),
            id,
        }
    }

    /// Positional parameters, or `None` when the request carries named params
    /// (possible for requests decoded from inbound traffic).
    pub fn positional(&self) -> Option<&[Value]> {
        self.params.as_array().map(|v| v.as_slice())
    }
}

/// A decoded response envelope. `result` stays an uninterpreted [`Value`];
/// typed decoding is deferred to the caller (see [`crate::decode`]).
///
/// A present-but-null `result` decodes as `Some(Value::Null)`: null is a
/// routine valid answer (e.g. `eth_getTransactionByHash` for an unknown
/// hash). `None` means the field was absent from the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(
        default,
        deserialize_with = "value_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    #[serde(default)]
    pub id: Value,
}

fn value_or_null<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "jsonrpc error {}: {}", self.code, self.message)
    }
}
