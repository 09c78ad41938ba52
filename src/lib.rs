pub mod api;
pub mod chains;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod evaluator;
pub mod jsonrpc;

pub use api::{Call, EthApi};
pub use endpoint::{OverrideFn, RpcEndpoint};
pub use error::{Result, RpcError};
pub use evaluator::{evaluate, RpcPool, SELECTION_WINDOW};
pub use jsonrpc::{ErrorObject, IdSequence, JsonRpcRequest, JsonRpcResponse};
