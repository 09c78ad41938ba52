use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::api::Call;
use crate::error::{Result, RpcError};
use crate::jsonrpc::{IdSequence, JsonRpcRequest, JsonRpcResponse};

/// A locally registered handler answering one method without network I/O.
/// Handlers receive the request's positional parameters and produce the raw
/// result value.
pub type OverrideFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// A client for a single JSON-RPC endpoint.
///
/// Calls to methods with a registered override never touch the network; a
/// handle without a host acts purely as an override container.
pub struct RpcEndpoint {
    host: Option<Url>,
    client: reqwest::Client,
    credentials: Option<(String, String)>,
    overrides: HashMap<String, OverrideFn>,
    ids: IdSequence,
    latency: Option<Duration>,
    block: Option<u64>,
}

impl std::fmt::Debug for RpcEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcEndpoint")
            .field("host", &self.host)
            .field("client", &self.client)
            .field("credentials", &self.credentials)
            .field("overrides", &self.overrides.keys())
            .field("ids", &self.ids)
            .field("latency", &self.latency)
            .field("block", &self.block)
            .finish()
    }
}

impl RpcEndpoint {
    /// Creates a client for the given endpoint address.
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self {
            host: Some(Url::parse(host)?),
            ..Self::local()
        })
    }

    /// Creates a host-less client that can only answer through overrides,
    /// e.g. for tests or local simulation.
    pub fn local() -> Self {
        Self {
            host: None,
            client: reqwest::Client::new(),
            credentials: None,
            overrides: HashMap::new(),
            ids: IdSequence::new(),
            latency: None,
            block: None,
        }
    }

    pub fn host(&self) -> Option<&Url> {
        self.host.as_ref()
    }

    /// Latency measured by the last evaluation probe, if any. Advisory only.
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// Block height observed by the last evaluation probe, if any.
    pub fn block(&self) -> Option<u64> {
        self.block
    }

    /// Redirects calls to `method` to a local handler instead of the network.
    ///
    /// Registration takes `&mut self`, so it cannot race in-flight calls; the
    /// override table is read-only while the handle is shared.
    pub fn register_override<F>(&mut self, method: &str, f: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.overrides.insert(method.to_string(), Arc::new(f));
    }

    /// Attaches basic-auth credentials to all subsequent network requests.
    /// Override-routed calls are unaffected.
    pub fn set_basic_auth(&mut self, username: &str, password: &str) {
        self.credentials = Some((username.to_string(), password.to_string()));
    }

    /// Performs a JSON-RPC call with positional parameters.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let req = JsonRpcRequest::new(method, params, self.ids.next_id());
        self.send(&req).await
    }

    /// Dispatches a prepared request: override first, then the network.
    ///
    /// No retries happen here; a failed call returns immediately.
    pub async fn send(&self, req: &JsonRpcRequest) -> Result<Value> {
        if let Some(f) = self.overrides.get(&req.method) {
            let Some(params) = req.positional() else {
                return Err(RpcError::PositionalParams(req.method.clone()));
            };
            tracing::debug!(method = %req.method, "dispatching to local override");
            return f(params).map_err(|e| RpcError::Override {
                method: req.method.clone(),
                source: e,
            });
        }

        let Some(host) = &self.host else {
            return Err(RpcError::NotFound(req.method.clone()));
        };

        let mut hreq = self.client.post(host.clone()).json(req);
        if let Some((username, password)) = &self.credentials {
            hreq = hreq.basic_auth(username, Some(password));
        }

        tracing::debug!(method = %req.method, host = %host, "sending rpc request");
        let resp = hreq.send().await.map_err(|e| RpcError::Transport {
            method: req.method.clone(),
            source: e,
        })?;
        let body = resp.bytes().await.map_err(|e| RpcError::Transport {
            method: req.method.clone(),
            source: e,
        })?;

        let envelope: JsonRpcResponse =
            serde_json::from_slice(&body).map_err(|e| RpcError::Decode {
                method: req.method.clone(),
                source: e,
            })?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Protocol {
                method: req.method.clone(),
                error,
            });
        }
        envelope.result.ok_or_else(|| RpcError::EmptyEnvelope {
            method: req.method.clone(),
        })
    }

    pub(crate) fn record_probe(&mut self, latency: Duration, block: u64) {
        self.latency = Some(latency);
        self.block = Some(block);
    }
}

#[async_trait]
impl Call for RpcEndpoint {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        RpcEndpoint::call(self, method, params).await
    }
}
