//! JSON-RPC transport with explicit endpoint fallback.
//!
//! An [`RpcClient`] talks to one chain through an ordered list of HTTP
//! endpoints ([`RpcEndpoints`]), each backed by its own alloy
//! [`RootProvider`]. Each request tries endpoints from the healthiest down;
//! a transport failure, timeout, bad status or undecodable body moves on to
//! the next one. Every outcome feeds a per-endpoint health score, so a flaky
//! endpoint sinks below its peers on later requests.
//!
//! A JSON-RPC `error` object is an answer, not a transport failure: it is
//! returned to the caller without trying further endpoints.
//!
//! [`RpcClientCache`] hands out one shared client per chain.

use std::collections::HashMap;
use std::future::IntoFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient as AlloyRpcClient;
use alloy_rpc_types_eth::{BlockId, TransactionInput, TransactionRequest};
use alloy_transport::{TransportError, TransportResult};
use alloy_transport_http::Http;
use dashmap::DashMap;
use payintent::chain::ChainId;
use payintent::error::LookupError;
use url::Url;

/// Health score of a fresh endpoint, in per-mille.
pub const MAX_HEALTH: u32 = 1000;

const SERVICE: &str = "rpc";

/// Errors from the JSON-RPC transport.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No endpoints configured for the chain.
    #[error("no RPC endpoints configured for chain {0}")]
    NoEndpoints(ChainId),
    /// The endpoint could not be reached or did not answer with JSON-RPC.
    #[error("RPC request to {url} failed: {source}")]
    Transport {
        /// Endpoint that failed.
        url: Url,
        /// Underlying alloy transport error.
        #[source]
        source: TransportError,
    },
    /// The endpoint did not answer within the configured timeout.
    #[error("RPC request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Endpoint that timed out.
        url: Url,
        /// The timeout that elapsed.
        timeout: Duration,
    },
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// Call return data could not be decoded.
    #[error("could not decode return data: {0}")]
    Decode(String),
    /// Every endpoint failed; carries the last failure.
    #[error("all {attempts} RPC endpoints for chain {chain_id} failed, last error: {last}")]
    AllEndpointsFailed {
        /// Chain being queried.
        chain_id: ChainId,
        /// Number of endpoints tried.
        attempts: usize,
        /// Failure from the last endpoint tried.
        last: Box<Self>,
    },
}

impl RpcError {
    /// Returns `true` if the failure was a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::AllEndpointsFailed { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    /// Splits an alloy error into a node answer (`Ok`) or an endpoint failure (`Err`).
    fn from_transport(url: &Url, source: TransportError) -> Result<Self, Self> {
        match source.as_error_resp() {
            Some(payload) => Ok(Self::JsonRpc {
                code: payload.code,
                message: payload.message.to_string(),
            }),
            None => Err(Self::Transport {
                url: url.clone(),
                source,
            }),
        }
    }
}

impl From<RpcError> for LookupError {
    fn from(error: RpcError) -> Self {
        if error.is_timeout() {
            return Self::Timeout { service: SERVICE };
        }
        match error {
            RpcError::JsonRpc { .. } | RpcError::Decode(_) => {
                Self::invalid_response(SERVICE, error.to_string())
            }
            _ => Self::transport(SERVICE, error.to_string()),
        }
    }
}

/// Ordered endpoint list with rolling health scores.
///
/// Scores are per-mille exponential moving averages: success moves a score
/// a fifth of the way towards [`MAX_HEALTH`], failure drops it by a fifth.
#[derive(Debug)]
pub struct RpcEndpoints {
    urls: Vec<Url>,
    health: Vec<AtomicU32>,
}

impl RpcEndpoints {
    /// Creates an endpoint list; every endpoint starts fully healthy.
    #[must_use]
    pub fn new(urls: Vec<Url>) -> Self {
        let health = urls.iter().map(|_| AtomicU32::new(MAX_HEALTH)).collect();
        Self { urls, health }
    }

    /// Returns the number of endpoints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns `true` if there are no endpoints.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns the endpoint URL at `index`.
    #[must_use]
    pub fn url(&self, index: usize) -> Option<&Url> {
        self.urls.get(index)
    }

    /// Returns the health score of the endpoint at `index`.
    #[must_use]
    pub fn health(&self, index: usize) -> Option<u32> {
        self.health.get(index).map(|h| h.load(Ordering::Relaxed))
    }

    /// Endpoint indices in the order they should be tried: descending health,
    /// ties broken by configured order.
    #[must_use]
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.urls.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.health[i].load(Ordering::Relaxed)));
        order
    }

    /// Records a successful request against the endpoint at `index`.
    pub fn record_success(&self, index: usize) {
        self.update(index, |score| (score * 4 + MAX_HEALTH) / 5);
    }

    /// Records a failed request against the endpoint at `index`.
    pub fn record_failure(&self, index: usize) {
        self.update(index, |score| score * 4 / 5);
    }

    fn update(&self, index: usize, f: impl Fn(u32) -> u32) {
        if let Some(health) = self.health.get(index) {
            let _ = health.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| Some(f(s)));
        }
    }
}

/// JSON-RPC client for one chain.
#[derive(Debug)]
pub struct RpcClient {
    chain_id: ChainId,
    endpoints: RpcEndpoints,
    providers: Vec<RootProvider>,
    timeout: Option<Duration>,
}

impl RpcClient {
    /// Creates a client for `chain_id` over `urls`, tried in the given order
    /// until health scores diverge.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NoEndpoints`] if `urls` is empty.
    pub fn new(chain_id: ChainId, urls: Vec<Url>) -> Result<Self, RpcError> {
        if urls.is_empty() {
            return Err(RpcError::NoEndpoints(chain_id));
        }
        let providers = urls
            .iter()
            .map(|url| {
                #[cfg(feature = "telemetry")]
                tracing::info!(chain = %chain_id, rpc_url = %url, "Using HTTP transport");
                RootProvider::new(AlloyRpcClient::new(Http::new(url.clone()), false))
            })
            .collect();
        Ok(Self {
            chain_id,
            endpoints: RpcEndpoints::new(urls),
            providers,
            timeout: None,
        })
    }

    /// Sets a per-request timeout applied to each endpoint attempt.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the chain this client talks to.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns the endpoint list and its health.
    #[must_use]
    pub const fn endpoints(&self) -> &RpcEndpoints {
        &self.endpoints
    }

    /// Returns the per-request timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Executes `eth_call` against the latest block and returns the raw return data.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::JsonRpc`] if a node answered with an error object
    /// (a revert, for instance), or [`RpcError::AllEndpointsFailed`] if no
    /// endpoint produced an answer.
    pub async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let request = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::both(data));
        self.with_failover(|provider| provider.call(request.clone()).block(BlockId::latest()))
            .await
    }

    /// Runs `call` against each endpoint in health order until one answers.
    async fn with_failover<T, C>(&self, call: impl Fn(&RootProvider) -> C) -> Result<T, RpcError>
    where
        C: IntoFuture<Output = TransportResult<T>>,
    {
        let order = self.endpoints.ranked();
        let attempts = order.len();
        let mut last = None;
        for index in order {
            let (Some(url), Some(provider)) = (self.endpoints.url(index), self.providers.get(index))
            else {
                continue;
            };
            let attempt = call(provider).into_future();
            let outcome = match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, attempt)
                    .await
                    .map_err(|_| RpcError::Timeout {
                        url: url.clone(),
                        timeout,
                    }),
                None => Ok(attempt.await),
            };
            let error = match outcome {
                Ok(Ok(result)) => {
                    self.endpoints.record_success(index);
                    return Ok(result);
                }
                Ok(Err(source)) => match RpcError::from_transport(url, source) {
                    Ok(answer) => {
                        self.endpoints.record_success(index);
                        return Err(answer);
                    }
                    Err(error) => error,
                },
                Err(timeout) => timeout,
            };
            #[cfg(feature = "telemetry")]
            tracing::warn!(chain = %self.chain_id, rpc_url = %url, %error, "RPC endpoint failed, trying next");
            self.endpoints.record_failure(index);
            last = Some(error);
        }
        Err(RpcError::AllEndpointsFailed {
            chain_id: self.chain_id,
            attempts,
            last: Box::new(last.unwrap_or(RpcError::NoEndpoints(self.chain_id))),
        })
    }
}

/// One shared [`RpcClient`] per chain, built on first use.
///
/// The cache is an explicit object: whoever needs RPC access owns one (or
/// an `Arc` of one). Clients are never evicted.
#[derive(Debug, Default)]
pub struct RpcClientCache {
    endpoints: HashMap<ChainId, Vec<Url>>,
    timeout: Option<Duration>,
    chain_timeouts: HashMap<ChainId, Duration>,
    clients: DashMap<ChainId, Arc<RpcClient>>,
}

impl RpcClientCache {
    /// Creates an empty cache with no configured endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the endpoints used when the client for `chain_id` is built.
    #[must_use]
    pub fn with_endpoints(mut self, chain_id: ChainId, urls: Vec<Url>) -> Self {
        self.endpoints.insert(chain_id, urls);
        self
    }

    /// Sets the per-request timeout for every client built by this cache.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the per-request timeout for clients of `chain_id`.
    #[must_use]
    pub fn with_chain_timeout(mut self, chain_id: ChainId, timeout: Duration) -> Self {
        self.chain_timeouts.insert(chain_id, timeout);
        self
    }

    /// Returns the chains with configured endpoints.
    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.endpoints.keys().copied()
    }

    /// Returns the client for `chain_id`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NoEndpoints`] if the chain has no configured endpoints.
    pub fn get_or_create(&self, chain_id: ChainId) -> Result<Arc<RpcClient>, RpcError> {
        if let Some(client) = self.clients.get(&chain_id) {
            return Ok(Arc::clone(client.value()));
        }
        let entry = self.clients.entry(chain_id).or_try_insert_with(|| {
            let urls = self.endpoints.get(&chain_id).cloned().unwrap_or_default();
            let client = RpcClient::new(chain_id, urls)?;
            let timeout = self.chain_timeouts.get(&chain_id).copied().or(self.timeout);
            let client = match timeout {
                Some(timeout) => client.with_timeout(timeout),
                None => client,
            };
            Ok::<_, RpcError>(Arc::new(client))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Returns the number of clients built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no client has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
