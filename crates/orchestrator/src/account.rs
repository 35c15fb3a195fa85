//! Holder-side operations: portfolio, reward claims and rent payment.

use ledger::{calls, Address};
use propchain_core::{sum_wei, Property, PropertyId};
use tracing::{debug, info, warn};

use crate::context::WorkflowContext;
use crate::error::Result;
use crate::step::StepReceipt;

/// A property the account holds tokens of.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub property: Property,
    pub balance: String,
    /// Claimable rent yield in wei.
    pub available_rewards: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub owner: Address,
    pub holdings: Vec<Holding>,
    /// Sum of claimable rewards over all holdings, in wei.
    pub total_rewards: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentPayment {
    pub receipt: StepReceipt,
    pub rent_paid_wei: String,
}

pub struct AccountOperations {
    ctx: WorkflowContext,
}

impl AccountOperations {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    async fn account(&self, owner: Option<&Address>) -> Result<Address> {
        match owner {
            Some(address) => Ok(address.clone()),
            None => Ok(self.ctx.signer.active_account().await?),
        }
    }

    /// Properties the account holds a positive balance of.
    ///
    /// A property whose reads fail is logged and skipped.
    pub async fn portfolio(&self, owner: Option<&Address>) -> Result<Portfolio> {
        let owner = self.account(owner).await?;
        let ids = self.ctx.contract.all_property_ids().await?;
        debug!(owner = %owner, properties = ids.len(), "Scanning holdings");

        let mut holdings = Vec::new();
        for id in ids {
            self.ctx.ensure_not_cancelled()?;
            match self.holding(&owner, id).await {
                Ok(Some(holding)) => holdings.push(holding),
                Ok(None) => {}
                Err(e) => warn!(property_id = %id, error = %e, "Skipping property"),
            }
        }

        let total_rewards = sum_wei(holdings.iter().map(|h| h.available_rewards.as_str()))?;
        info!(
            owner = %owner,
            holdings = holdings.len(),
            total_rewards = %total_rewards,
            "Portfolio loaded"
        );

        Ok(Portfolio {
            owner,
            holdings,
            total_rewards,
        })
    }

    async fn holding(&self, owner: &Address, id: PropertyId) -> ledger::Result<Option<Holding>> {
        let balance = self.ctx.contract.balance_of(owner, id).await?;
        if balance.trim_start_matches('0').is_empty() {
            return Ok(None);
        }

        let property = self.ctx.contract.get_property(id).await?;
        let available_rewards = self.ctx.contract.available_rewards(owner, id).await?;
        Ok(Some(Holding {
            property,
            balance,
            available_rewards,
        }))
    }

    pub async fn claim_rewards(&self, id: PropertyId) -> Result<StepReceipt> {
        self.ctx.ensure_not_cancelled()?;
        let signer = self.ctx.signer.active_account().await?;

        info!(property_id = %id, account = %signer, "Claiming rewards");
        Ok(self
            .ctx
            .steps
            .submit(&calls::claim_rewards(id), &signer, self.ctx.config.account_gas)
            .await?)
    }

    /// Pay the property's rent, attaching exactly the rent stored on the ledger.
    pub async fn pay_rent(&self, id: PropertyId, access_code: &str) -> Result<RentPayment> {
        self.ctx.ensure_not_cancelled()?;
        let signer = self.ctx.signer.active_account().await?;
        let property = self.ctx.contract.get_property(id).await?;

        info!(property_id = %id, account = %signer, rent_wei = %property.rent, "Paying rent");
        let receipt = self
            .ctx
            .steps
            .submit_payable(
                &calls::pay_rent(id, access_code),
                &signer,
                self.ctx.config.account_gas,
                &property.rent,
            )
            .await?;

        Ok(RentPayment {
            receipt,
            rent_paid_wei: property.rent,
        })
    }
}
