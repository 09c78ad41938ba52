use crate::jsonrpc::ErrorObject;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("no endpoints available")]
    NoEndpoints,

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("error while performing {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response to {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response to {method} carries neither result nor error")]
    EmptyEnvelope { method: String },

    #[error("rpc error during {method}: {error}")]
    Protocol { method: String, error: ErrorObject },

    #[error("method {0}: no host configured and no matching override")]
    NotFound(String),

    #[error("override for {0} only supports positional parameters")]
    PositionalParams(String),

    #[error("override for {method} failed: {source}")]
    Override {
        method: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to decode result value: {0}")]
    BadResult(#[from] serde_json::Error),

    #[error("invalid unsigned integer value: {0}")]
    InvalidValue(String),

    #[error("evaluation cancelled")]
    Cancelled,
}

impl RpcError {
    /// The server-reported error code, when this is a protocol error.
    pub fn protocol_code(&self) -> Option<i64> {
        match self {
            RpcError::Protocol { error, .. } => Some(error.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
