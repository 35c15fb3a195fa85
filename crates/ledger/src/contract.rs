use propchain_core::{Property, PropertyId, PropertyStatus};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;
use crate::types::{Address, ContractCall, SendOptions, TxReceipt};

/// Builders for the contract's state-changing methods.
pub mod calls {
    use propchain_core::{PropertyId, RegistrationRequest};
    use serde_json::Value;

    use crate::types::ContractCall;

    pub const REGISTER_PROPERTY: &str = "registerProperty";
    pub const PROCESS_VERIFICATION: &str = "processVerification";
    pub const PROCESS_PROPERTY_DATA: &str = "processPropertyData";
    pub const SET_TOKEN_PRICE_AND_MINT: &str = "setTokenPriceAndMint";
    pub const CLAIM_REWARDS: &str = "claimRewards";
    pub const PAY_RENT: &str = "payRent";

    pub fn register_property(request: &RegistrationRequest) -> ContractCall {
        ContractCall::new(
            REGISTER_PROPERTY,
            vec![
                Value::String(request.name.clone()),
                Value::String(request.location.clone()),
                Value::String(request.owner_id.clone()),
                request.property_id.to_arg(),
            ],
        )
    }

    pub fn process_verification(id: PropertyId) -> ContractCall {
        ContractCall::new(PROCESS_VERIFICATION, vec![id.to_arg()])
    }

    pub fn process_property_data(id: PropertyId) -> ContractCall {
        ContractCall::new(PROCESS_PROPERTY_DATA, vec![id.to_arg()])
    }

    pub fn set_token_price_and_mint(id: PropertyId, metadata_uri: &str) -> ContractCall {
        ContractCall::new(
            SET_TOKEN_PRICE_AND_MINT,
            vec![id.to_arg(), Value::String(metadata_uri.to_string())],
        )
    }

    pub fn claim_rewards(id: PropertyId) -> ContractCall {
        ContractCall::new(CLAIM_REWARDS, vec![id.to_arg()])
    }

    pub fn pay_rent(id: PropertyId, access_code: &str) -> ContractCall {
        ContractCall::new(
            PAY_RENT,
            vec![id.to_arg(), Value::String(access_code.to_string())],
        )
    }
}

/// Typed view of the property contract on top of a [`LedgerRpc`].
#[derive(Clone)]
pub struct PropertyContract {
    rpc: Arc<dyn LedgerRpc>,
}

impl PropertyContract {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    pub async fn get_property(&self, id: PropertyId) -> Result<Property> {
        let record = self.rpc.call("getProperty", vec![id.to_arg()]).await?;
        Ok(Property::from_ledger(id, &record)?)
    }

    pub async fn property_status(&self, id: PropertyId) -> Result<PropertyStatus> {
        let status = self.get_property(id).await?.status;
        debug!(property_id = %id, status = %status, "Property status read");
        Ok(status)
    }

    pub async fn all_property_ids(&self) -> Result<Vec<PropertyId>> {
        let value = self.rpc.call("getAllPropertyIDs", vec![]).await?;
        let items = value.as_array().ok_or_else(|| {
            LedgerError::InvalidResponse(format!("expected id list, got {}", value))
        })?;

        // Ids beyond u64 cannot be addressed here; listing the rest still works.
        Ok(items
            .iter()
            .filter_map(|v| match PropertyId::from_ledger_value(v) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "Skipping unsupported property id");
                    None
                }
            })
            .collect())
    }

    /// Token balance of `owner` for one property, as a decimal string.
    pub async fn balance_of(&self, owner: &Address, id: PropertyId) -> Result<String> {
        let value = self
            .rpc
            .call("balanceOf", vec![owner.to_arg(), id.to_arg()])
            .await?;
        uint_string(&value)
    }

    /// Rent yield `owner` can claim for one property, in wei.
    pub async fn available_rewards(&self, owner: &Address, id: PropertyId) -> Result<String> {
        let value = self
            .rpc
            .call("getAvailableRewards", vec![owner.to_arg(), id.to_arg()])
            .await?;
        uint_string(&value)
    }

    pub async fn submit(&self, call: &ContractCall, options: &SendOptions) -> Result<TxReceipt> {
        self.rpc.send(call.method, call.args.clone(), options).await
    }
}

fn uint_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(s.clone())
        }
        Value::Number(n) if n.is_u64() => Ok(n.to_string()),
        other => Err(LedgerError::InvalidResponse(format!(
            "expected unsigned integer, got {}",
            other
        ))),
    }
}
