#![allow(dead_code)]

use async_trait::async_trait;
use ledger::{
    Address, FixedSigner, LedgerError, LedgerRpc, PropertyContract, SendOptions, TxReceipt,
};
use orchestrator::{WorkflowConfig, WorkflowContext};
use pinning::{MetadataStore, PinningError};
use propchain_core::{PropertyId, PropertyStatus, RegistrationRequest, TokenMetadata};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const SIGNER: &str = "0x4444444444444444444444444444444444444444";
pub const PROPERTY_ID: u64 = 7;

#[derive(Debug, Clone)]
pub struct SentCall {
    pub method: String,
    pub args: Vec<Value>,
    pub options: SendOptions,
}

struct LedgerState {
    status: PropertyStatus,
    rent: String,
    /// Status a send moves the property to, and how many reads still see
    /// the old status.
    pending: Option<(PropertyStatus, u32)>,
    effects: HashMap<String, PropertyStatus>,
    /// Status the oracle moves on to, unprompted, right after reaching a key.
    follow_ups: HashMap<PropertyStatus, PropertyStatus>,
    failures: HashMap<String, VecDeque<LedgerError>>,
    sends: Vec<SentCall>,
    balances: HashMap<u64, String>,
    rewards: HashMap<u64, String>,
    property_ids: Vec<u64>,
}

/// In-memory ledger whose oracle applies each step's effect after a lag.
pub struct ScriptedLedger {
    state: Mutex<LedgerState>,
    oracle_lag: u32,
}

impl ScriptedLedger {
    pub fn new(status: PropertyStatus) -> Self {
        let effects = [
            ("registerProperty", PropertyStatus::Registered),
            ("processVerification", PropertyStatus::Verified),
            ("processPropertyData", PropertyStatus::DataReady),
            ("setTokenPriceAndMint", PropertyStatus::Minted),
        ]
        .into_iter()
        .map(|(m, s)| (m.to_string(), s))
        .collect();

        Self {
            state: Mutex::new(LedgerState {
                status,
                rent: "2000000000000000".to_string(),
                pending: None,
                effects,
                follow_ups: HashMap::new(),
                failures: HashMap::new(),
                sends: Vec::new(),
                balances: HashMap::new(),
                rewards: HashMap::new(),
                property_ids: vec![PROPERTY_ID],
            }),
            oracle_lag: 1,
        }
    }

    /// Queue failures returned by the next sends of `method`.
    pub fn fail_next(self, method: &str, errors: Vec<LedgerError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), errors.into());
        self
    }

    /// The oracle never reacts to `method`.
    pub fn without_effect(self, method: &str) -> Self {
        self.state.lock().unwrap().effects.remove(method);
        self
    }

    /// Once the oracle reaches `reached`, the next read already sees `next`.
    pub fn then_moves_on(self, reached: PropertyStatus, next: PropertyStatus) -> Self {
        self.state.lock().unwrap().follow_ups.insert(reached, next);
        self
    }

    pub fn with_holding(self, id: u64, balance: &str, rewards: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            if !state.property_ids.contains(&id) {
                state.property_ids.push(id);
            }
            state.balances.insert(id, balance.to_string());
            state.rewards.insert(id, rewards.to_string());
        }
        self
    }

    pub fn with_property_ids(self, ids: Vec<u64>) -> Self {
        self.state.lock().unwrap().property_ids = ids;
        self
    }

    pub fn sends(&self) -> Vec<SentCall> {
        self.state.lock().unwrap().sends.clone()
    }

    pub fn sent_methods(&self) -> Vec<String> {
        self.sends().into_iter().map(|s| s.method).collect()
    }

    pub fn status(&self) -> PropertyStatus {
        self.state.lock().unwrap().status
    }
}

fn id_arg(args: &[Value], index: usize) -> u64 {
    args.get(index)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

#[async_trait]
impl LedgerRpc for ScriptedLedger {
    async fn call(&self, method: &str, args: Vec<Value>) -> ledger::Result<Value> {
        let mut state = self.state.lock().unwrap();
        match method {
            "getProperty" => {
                if let Some((target, remaining)) = state.pending {
                    if remaining == 0 {
                        state.status = target;
                        state.pending = state.follow_ups.get(&target).map(|next| (*next, 0));
                    } else {
                        state.pending = Some((target, remaining - 1));
                    }
                }
                Ok(json!({
                    "name": "Lake House",
                    "location": "Pune",
                    "ownerID": "OWN-9",
                    "price": "1000000000000000000",
                    "rent": state.rent,
                    "tenantcode": "",
                    "status": state.status.code().to_string(),
                }))
            }
            "getAllPropertyIDs" => Ok(json!(state
                .property_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>())),
            "balanceOf" => Ok(json!(state
                .balances
                .get(&id_arg(&args, 1))
                .cloned()
                .unwrap_or_else(|| "0".to_string()))),
            "getAvailableRewards" => {
                let id = id_arg(&args, 1);
                match state.rewards.get(&id) {
                    Some(r) if r == "broken" => {
                        Err(LedgerError::Unreachable("connection reset".to_string()))
                    }
                    Some(r) => Ok(json!(r)),
                    None => Ok(json!("0")),
                }
            }
            other => Err(LedgerError::Reverted {
                reason: format!("unknown method {}", other),
            }),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: &SendOptions,
    ) -> ledger::Result<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.sends.push(SentCall {
            method: method.to_string(),
            args,
            options: options.clone(),
        });

        if let Some(error) = state.failures.get_mut(method).and_then(VecDeque::pop_front) {
            return Err(error);
        }

        if let Some(target) = state.effects.get(method).copied() {
            state.pending = Some((target, self.oracle_lag));
        }

        Ok(TxReceipt {
            transaction_hash: format!("0x{:064x}", state.sends.len()),
            block_number: Some(state.sends.len() as u64),
        })
    }

    async fn accounts(&self) -> ledger::Result<Vec<Address>> {
        Ok(vec![Address::parse(SIGNER)?])
    }

    async fn request_accounts(&self) -> ledger::Result<Vec<Address>> {
        self.accounts().await
    }
}

/// Metadata store with a fixed answer; `None` means the upload fails.
pub struct StaticStore(pub Option<String>);

#[async_trait]
impl MetadataStore for StaticStore {
    async fn store(&self, _document: &TokenMetadata) -> pinning::Result<String> {
        self.0.clone().ok_or(PinningError::MissingCredentials)
    }
}

pub fn context(ledger: &Arc<ScriptedLedger>, store: StaticStore) -> WorkflowContext {
    context_with(ledger, store, WorkflowConfig::default())
}

pub fn context_with(
    ledger: &Arc<ScriptedLedger>,
    store: StaticStore,
    config: WorkflowConfig,
) -> WorkflowContext {
    let rpc: Arc<dyn LedgerRpc> = ledger.clone();
    WorkflowContext::new(
        PropertyContract::new(rpc),
        Arc::new(FixedSigner::new(Address::parse(SIGNER).unwrap())),
        Arc::new(store),
        config,
    )
}

pub fn request() -> RegistrationRequest {
    RegistrationRequest::new(PropertyId::new(PROPERTY_ID), "Lake House", "Pune", "OWN-9").unwrap()
}

pub fn oracle_not_ready() -> LedgerError {
    LedgerError::OracleNotReady {
        reason: "Invalid data".to_string(),
    }
}
