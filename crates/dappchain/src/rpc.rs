//! JSON-RPC client for a DAppChain node.
//!
//! Reads go to `<endpoint>/query`, transactions to `<endpoint>/rpc`. Contract
//! calls are JSON envelopes signed with the caller's key; the node checks the
//! signature against the caller address and the per-account sequence number.

use crate::{address::AddressError, ChainAddress, Result};
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DAppChainError {
    /// Transport failure talking to the node
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Node answered with a non-success HTTP status
    #[error("node returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON-RPC level error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transaction was rejected by check or deliver phase
    #[error("transaction rejected with code {code}: {log}")]
    TxRejected { code: u32, log: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to sign transaction: {0}")]
    Signing(#[from] alloy_signer::Error),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("contract {0:?} is not deployed")]
    UnknownContract(String),
}

impl DAppChainError {
    /// Whether repeating the read may succeed: transport failures and 5xx answers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Attempts after the first failed read.
const READ_RETRIES: usize = 3;

/// Receipt of a committed sidechain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxReceipt {
    pub hash: B256,
    pub height: u64,
    /// Return value of the contract method, if any
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl TxReceipt {
    /// Decode the contract method's return value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.data.clone().unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

/// A JSON-RPC client bound to one account on one DAppChain.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    chain_id: String,
    signer: PrivateKeySigner,
}

impl RpcClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the node (e.g. "https://plasma.dappchains.com")
    /// * `chain_id` - Chain id prefixed to every sidechain address
    /// * `signer` - Key of the account sending transactions
    pub fn new(
        endpoint: impl Into<String>,
        chain_id: impl Into<String>,
        signer: PrivateKeySigner,
    ) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, chain_id, signer)
    }

    /// Creates a new client with a custom HTTP client.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        chain_id: impl Into<String>,
        signer: PrivateKeySigner,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            chain_id: chain_id.into(),
            signer,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The caller's sidechain identity.
    pub fn address(&self) -> ChainAddress {
        ChainAddress::new(self.chain_id.clone(), self.signer.address())
    }

    /// Qualify a bare local address with this client's chain id.
    pub fn prefix_address(&self, input: &str) -> Result<ChainAddress> {
        Ok(ChainAddress::parse_with_default_chain(
            input,
            &self.chain_id,
        )?)
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.endpoint)
    }

    fn tx_url(&self) -> String {
        format!("{}/rpc", self.endpoint)
    }

    /// Resolve a built-in contract's address by name.
    ///
    /// A `null` answer means no contract is registered under `name`.
    pub async fn resolve(&self, name: &str) -> Result<ChainAddress> {
        let resolved: Option<ChainAddress> = self.read("resolve", ResolveParams { name }).await?;
        resolved.ok_or_else(|| DAppChainError::UnknownContract(name.to_string()))
    }

    /// Next transaction sequence number of the caller.
    pub async fn nonce(&self) -> Result<u64> {
        let account = self.address().to_string();
        self.read("nonce", NonceParams { account }).await
    }

    /// Call a read-only contract method.
    pub async fn query<A, R>(&self, contract: &ChainAddress, method: &str, args: A) -> Result<R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        debug!(contract = %contract, method, "Querying contract");

        let params = QueryParams {
            contract: contract.to_string(),
            method,
            args,
            caller: self.address().to_string(),
        };

        self.read("query", params).await
    }

    /// Query endpoint request, retried with exponential backoff on transient failures.
    async fn read<P, R>(&self, method: &'static str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = self.query_url();
        let retry_strategy = ExponentialBackoff::from_millis(100).take(READ_RETRIES);

        RetryIf::spawn(
            retry_strategy,
            || async {
                self.send(&url, method, &params).await.map_err(|e| {
                    if e.is_transient() {
                        warn!(method, error = %e, "DAppChain read failed, will retry");
                    }
                    e
                })
            },
            DAppChainError::is_transient,
        )
        .await
    }

    /// Send a signed contract call and wait for it to be committed.
    pub async fn call<A>(&self, contract: &ChainAddress, method: &str, args: A) -> Result<TxReceipt>
    where
        A: Serialize,
    {
        let sequence = self.nonce().await? + 1;

        let call = ContractCall {
            chain_id: &self.chain_id,
            caller: self.address().to_string(),
            contract: contract.to_string(),
            method,
            args,
            sequence,
        };

        let payload = serde_json::to_vec(&call)?;
        let signature = self.signer.sign_message_sync(&payload)?;

        let tx = SignedTx {
            payload: Bytes::from(payload),
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
            signer: self.signer.address(),
        };

        debug!(contract = %contract, method, sequence, "Broadcasting contract call");

        let commit: TxCommit = self.send(&self.tx_url(), "broadcast_tx_commit", [tx]).await?;
        commit.into_receipt()
    }

    async fn send<P, R>(&self, url: &str, method: &'static str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self.http.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(DAppChainError::Status { status, body });
        }

        let rpc_response: JsonRpcResponse = response.json().await?;
        rpc_response.into_result()
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u32,
}

/// `result` is `Some(Value::Null)` for an explicit `null` and `None` when absent.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default, deserialize_with = "present")]
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(DAppChainError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(serde_json::from_value(result)?),
            (None, None) => Err(DAppChainError::Rpc {
                code: -1,
                message: "empty response".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct ResolveParams<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct NonceParams {
    account: String,
}

#[derive(Debug, Serialize)]
struct QueryParams<'a, A> {
    contract: String,
    method: &'a str,
    args: A,
    caller: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractCall<'a, A> {
    chain_id: &'a str,
    caller: String,
    contract: String,
    method: &'a str,
    args: A,
    sequence: u64,
}

#[derive(Debug, Serialize)]
struct SignedTx {
    payload: Bytes,
    signature: Bytes,
    signer: Address,
}

/// Check/deliver phase result of a committed transaction.
#[derive(Debug, Default, Deserialize)]
struct TxPhase {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxCommit {
    hash: B256,
    height: u64,
    #[serde(default)]
    check_tx: TxPhase,
    #[serde(default)]
    deliver_tx: TxPhase,
}

impl TxCommit {
    fn into_receipt(self) -> Result<TxReceipt> {
        for phase in [&self.check_tx, &self.deliver_tx] {
            if phase.code != 0 {
                return Err(DAppChainError::TxRejected {
                    code: phase.code,
                    log: phase.log.clone(),
                });
            }
        }

        Ok(TxReceipt {
            hash: self.hash,
            height: self.height,
            data: self.deliver_tx.data,
        })
    }
}
