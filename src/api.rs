use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode;
use crate::error::Result;

/// The uniform call surface shared by a single endpoint and an evaluated pool.
#[async_trait]
pub trait Call: Send + Sync {
    /// Performs a JSON-RPC call with positional parameters and returns the
    /// raw result for the caller to decode.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value>;
}

/// Typed convenience wrappers over [`Call`].
#[async_trait]
pub trait EthApi: Call {
    async fn block_number(&self) -> Result<u64> {
        decode::read_u64(&self.call("eth_blockNumber", Vec::new()).await?)
    }

    async fn chain_id(&self) -> Result<u64> {
        decode::read_u64(&self.call("eth_chainId", Vec::new()).await?)
    }

    /// Performs the call and decodes the result into `T`.
    async fn fetch<T>(&self, method: &str, params: Vec<Value>) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        decode::read_as(self.call(method, params).await?)
    }
}

impl<T: Call + ?Sized> EthApi for T {}
