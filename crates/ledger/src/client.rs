use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::classify::ErrorClassifier;
use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;
use crate::types::{Address, RpcRequest, RpcResponse, SendOptions, TxReceipt};

const CALL_METHOD: &str = "contract_call";
const SEND_METHOD: &str = "contract_send";

/// JSON-RPC client for the wallet bridge, bound to one contract.
pub struct BridgeClient {
    base_url: String,
    contract: Address,
    client: Client,
    classifier: ErrorClassifier,
    next_id: AtomicU64,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, contract: Address) -> Self {
        Self::with_client(base_url, contract, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, contract: Address, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            contract,
            client,
            classifier: ErrorClassifier::default(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Unreachable(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body: RpcResponse = response.json().await?;
        match body.error {
            Some(error) => {
                let classified = self.classifier.classify(&error);
                debug!(
                    rpc_id = id,
                    method,
                    code = error.code,
                    error = %classified,
                    "Bridge returned error"
                );
                Err(classified)
            }
            None => Ok(body.result),
        }
    }

    fn parse_accounts(value: Value) -> Result<Vec<Address>> {
        let raw: Vec<String> = serde_json::from_value(value)?;
        raw.iter().map(|a| Address::parse(a)).collect()
    }
}

#[async_trait]
impl LedgerRpc for BridgeClient {
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        debug!(method, "Contract call");
        self.request(
            CALL_METHOD,
            json!({
                "contract": self.contract,
                "method": method,
                "args": args,
            }),
        )
        .await
    }

    async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: &SendOptions,
    ) -> Result<TxReceipt> {
        debug!(method, from = %options.from, gas = options.gas, "Contract send");
        let mut params = json!({
            "contract": self.contract,
            "method": method,
            "args": args,
            "from": options.from,
            "gas": options.gas,
        });
        if let Some(value) = &options.value {
            params["value"] = Value::String(value.clone());
        }

        let result = self.request(SEND_METHOD, params).await?;
        TxReceipt::from_value(result)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        let result = self.request("eth_accounts", json!([])).await?;
        Self::parse_accounts(result)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let result = self.request("eth_requestAccounts", json!([])).await?;
        Self::parse_accounts(result)
    }
}
