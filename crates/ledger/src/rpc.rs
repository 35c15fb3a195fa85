use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Address, SendOptions, TxReceipt};

/// Contract-level RPC surface of the wallet bridge.
///
/// Implementations classify provider failures into [`crate::LedgerError`]
/// before returning them.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Read-only contract call.
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value>;

    /// State-changing contract call. Resolves once the ledger acknowledges
    /// inclusion; never retried by the implementation.
    async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: &SendOptions,
    ) -> Result<TxReceipt>;

    /// Accounts the provider already exposes (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Ask the provider to expose accounts, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>>;
}
