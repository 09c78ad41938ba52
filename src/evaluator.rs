use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::Call;
use crate::decode;
use crate::endpoint::RpcEndpoint;
use crate::error::{Result, RpcError};

/// How long the evaluator keeps collecting after the first success. Candidates
/// answering inside the window are ranked; slower ones are dropped, which
/// bounds total evaluation time to first-success-time plus this window.
pub const SELECTION_WINDOW: Duration = Duration::from_millis(200);

/// An ordered set of evaluated endpoints. Rank 0 is the fastest responder.
///
/// A pool is replaced wholesale by re-running [`evaluate`]; endpoints are not
/// removed in place.
#[derive(Debug)]
pub struct RpcPool {
    endpoints: Vec<RpcEndpoint>,
}

impl RpcPool {
    fn new(endpoints: Vec<RpcEndpoint>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[RpcEndpoint] {
        &self.endpoints
    }

    /// The preferred (rank 0) endpoint.
    pub fn best(&self) -> &RpcEndpoint {
        &self.endpoints[0]
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Forwards to the preferred endpoint. A failure there is returned as-is:
    /// falling back to rank 1 is deliberately left to the caller, which knows
    /// whether the error class is worth retrying elsewhere.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.best().call(method, params).await
    }
}

#[async_trait]
impl Call for RpcPool {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        RpcPool::call(self, method, params).await
    }
}

enum Probe {
    Up(RpcEndpoint),
    Down(RpcError),
}

/// Probes every candidate concurrently with `eth_blockNumber` and returns the
/// subset that answered, ordered by completion. All probes start together, so
/// completion order is ascending latency order; no sort is performed.
///
/// A single candidate is returned unprobed. When every candidate fails, the
/// error of the last-arriving failure is returned. All in-flight probes are
/// cancelled when this returns, whichever exit branch fires.
pub async fn evaluate(cancel: &CancellationToken, servers: &[String]) -> Result<RpcPool> {
    if servers.is_empty() {
        return Err(RpcError::NoEndpoints);
    }
    if servers.len() == 1 {
        return Ok(RpcPool::new(vec![RpcEndpoint::new(&servers[0])?]));
    }

    let probes = cancel.child_token();
    let _stop = probes.clone().drop_guard();

    let (tx, mut rx) = mpsc::channel(servers.len());
    for server in servers {
        let server = server.clone();
        let probes = probes.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = match probe(&server, &probes).await {
                Ok(endpoint) => Probe::Up(endpoint),
                Err(e) => {
                    tracing::warn!(server = %server, error = %e, "endpoint probe failed");
                    Probe::Down(e)
                }
            };
            let _ = tx.send(outcome).await;
        });
    }
    drop(tx);

    let mut ranked: Vec<RpcEndpoint> = Vec::new();
    let mut outstanding = servers.len();
    let mut deadline: Option<Instant> = None;

    loop {
        // `deadline` is Copy; the window future owns its snapshot so the
        // receive arm below can update the variable.
        let window = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => futures::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                // Successes gathered so far are discarded with the evaluation.
                return Err(RpcError::Cancelled);
            }
            _ = window => {
                // Window elapsed; whatever arrived in time makes the cut.
                return Ok(RpcPool::new(ranked));
            }
            outcome = rx.recv() => {
                let Some(outcome) = outcome else {
                    // Every probe task reports exactly once before its sender
                    // drops, so the channel cannot close with results still
                    // outstanding.
                    unreachable!("probe channel closed with {outstanding} probes outstanding");
                };
                outstanding -= 1;
                match outcome {
                    Probe::Up(endpoint) => {
                        tracing::debug!(
                            server = endpoint.host().map(url::Url::as_str).unwrap_or("-"),
                            latency_ms = endpoint.latency().unwrap_or_default().as_millis() as u64,
                            "endpoint probe succeeded"
                        );
                        ranked.push(endpoint);
                        if outstanding == 0 {
                            return Ok(RpcPool::new(ranked));
                        }
                        if deadline.is_none() {
                            deadline = Some(Instant::now() + SELECTION_WINDOW);
                        }
                    }
                    Probe::Down(e) => {
                        if outstanding == 0 {
                            if ranked.is_empty() {
                                // Only the last-arriving failure is reported.
                                return Err(e);
                            }
                            return Ok(RpcPool::new(ranked));
                        }
                    }
                }
            }
        }
    }
}

async fn probe(server: &str, cancel: &CancellationToken) -> Result<RpcEndpoint> {
    let mut endpoint = RpcEndpoint::new(server)?;
    let start = Instant::now();
    let raw = tokio::select! {
        res = endpoint.call("eth_blockNumber", Vec::new()) => res?,
        _ = cancel.cancelled() => return Err(RpcError::Cancelled),
    };
    let block = decode::read_u64(&raw)?;
    endpoint.record_probe(start.elapsed(), block);
    Ok(endpoint)
}
