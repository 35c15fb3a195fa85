use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;
use crate::types::Address;

/// Source of the identity that signs state-changing calls.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn active_account(&self) -> Result<Address>;
}

/// Always signs as the configured address.
#[derive(Debug, Clone)]
pub struct FixedSigner {
    address: Address,
}

impl FixedSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

#[async_trait]
impl Signer for FixedSigner {
    async fn active_account(&self) -> Result<Address> {
        Ok(self.address.clone())
    }
}

/// Uses the first account the wallet bridge exposes, asking the wallet to
/// connect when none is exposed yet.
pub struct BridgeSigner {
    rpc: Arc<dyn LedgerRpc>,
}

impl BridgeSigner {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl Signer for BridgeSigner {
    async fn active_account(&self) -> Result<Address> {
        if let Some(account) = self.rpc.accounts().await?.into_iter().next() {
            return Ok(account);
        }

        info!("No account exposed by the wallet, requesting connection");
        self.rpc
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(LedgerError::NoAccount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SendOptions, TxReceipt};
    use serde_json::Value;

    const ACCOUNT: &str = "0x3333333333333333333333333333333333333333";

    struct Wallet {
        exposed: Vec<Address>,
        on_request: Vec<Address>,
    }

    #[async_trait]
    impl LedgerRpc for Wallet {
        async fn call(&self, _method: &str, _args: Vec<Value>) -> Result<Value> {
            unimplemented!()
        }

        async fn send(
            &self,
            _method: &str,
            _args: Vec<Value>,
            _options: &SendOptions,
        ) -> Result<TxReceipt> {
            unimplemented!()
        }

        async fn accounts(&self) -> Result<Vec<Address>> {
            Ok(self.exposed.clone())
        }

        async fn request_accounts(&self) -> Result<Vec<Address>> {
            Ok(self.on_request.clone())
        }
    }

    fn account() -> Address {
        Address::parse(ACCOUNT).unwrap()
    }

    #[tokio::test]
    async fn test_fixed_signer() {
        let signer = FixedSigner::new(account());
        assert_eq!(signer.active_account().await.unwrap(), account());
    }

    #[tokio::test]
    async fn test_bridge_signer_uses_exposed_account() {
        let signer = BridgeSigner::new(Arc::new(Wallet {
            exposed: vec![account()],
            on_request: vec![],
        }));
        assert_eq!(signer.active_account().await.unwrap(), account());
    }

    #[tokio::test]
    async fn test_bridge_signer_requests_connection() {
        let signer = BridgeSigner::new(Arc::new(Wallet {
            exposed: vec![],
            on_request: vec![account()],
        }));
        assert_eq!(signer.active_account().await.unwrap(), account());
    }

    #[tokio::test]
    async fn test_bridge_signer_without_accounts() {
        let signer = BridgeSigner::new(Arc::new(Wallet {
            exposed: vec![],
            on_request: vec![],
        }));
        assert_eq!(signer.active_account().await.unwrap_err(), LedgerError::NoAccount);
    }
}
