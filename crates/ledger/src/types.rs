use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Gas budget the wallet pages attach to every workflow transaction.
pub const DEFAULT_GAS: u64 = 500_000;

/// Hex account or contract address (`0x` + 40 hex digits), stored as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| LedgerError::InvalidAddress(s.to_string()))?;

        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_arg(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// A described state-changing contract operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub method: &'static str,
    pub args: Vec<Value>,
}

impl ContractCall {
    pub fn new(method: &'static str, args: Vec<Value>) -> Self {
        Self { method, args }
    }
}

/// Signing options attached to a `send`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendOptions {
    pub from: Address,
    pub gas: u64,
    /// Wei attached to payable calls, as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SendOptions {
    pub fn new(from: Address, gas: u64) -> Self {
        Self {
            from,
            gas,
            value: None,
        }
    }

    pub fn with_value(mut self, wei: impl Into<String>) -> Self {
        self.value = Some(wei.into());
        self
    }
}

/// Acknowledgment of an included transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl TxReceipt {
    /// Some bridges answer a send with the bare hash instead of a receipt.
    pub fn from_value(value: Value) -> Result<Self, LedgerError> {
        match value {
            Value::String(hash) => Ok(Self {
                transaction_hash: hash,
                block_number: None,
            }),
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(LedgerError::InvalidResponse(format!(
                "expected transaction receipt, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
