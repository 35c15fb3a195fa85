use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Identifier of a property on the ledger.
///
/// The contract stores ids as `uint256`; they are sent over the bridge as
/// decimal strings so no precision is lost on the JavaScript side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PropertyId(u64);

impl PropertyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Argument form used in contract calls.
    pub fn to_arg(&self) -> Value {
        Value::String(self.0.to_string())
    }

    /// Parse an id as returned by the ledger (number or decimal string).
    pub fn from_ledger_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map(Self)
                .ok_or_else(|| CoreError::InvalidPropertyId(n.to_string())),
            Value::String(s) => s.parse(),
            other => Err(CoreError::InvalidPropertyId(other.to_string())),
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PropertyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidPropertyId(s.to_string()))
    }
}

/// Lifecycle status of a property as stored by the contract.
///
/// Status only ever moves forward for a given property.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Pending,
    Registered,
    Verified,
    DataReady,
    Minted,
}

impl PropertyStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Registered => 1,
            Self::Verified => 2,
            Self::DataReady => 3,
            Self::Minted => 4,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Registered),
            2 => Some(Self::Verified),
            3 => Some(Self::DataReady),
            4 => Some(Self::Minted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Registered => "registered",
            Self::Verified => "verified",
            Self::DataReady => "data_ready",
            Self::Minted => "minted",
        }
    }

    /// Decode the status field of a ledger record. The bridge returns enum
    /// values as decimal strings, some providers as plain numbers.
    pub fn from_ledger_value(value: &Value) -> Result<Self> {
        let code = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        code.and_then(Self::from_code)
            .ok_or_else(|| CoreError::UnknownStatus(value.to_string()))
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of the registration workflow, captured once per user action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub property_id: PropertyId,
    pub name: String,
    pub location: String,
    pub owner_id: String,
}

impl RegistrationRequest {
    pub fn new(
        property_id: PropertyId,
        name: impl Into<String>,
        location: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Result<Self> {
        let request = Self {
            property_id,
            name: name.into().trim().to_string(),
            location: location.into().trim().to_string(),
            owner_id: owner_id.into().trim().to_string(),
        };

        for (field, value) in [
            ("name", &request.name),
            ("location", &request.location),
            ("owner_id", &request.owner_id),
        ] {
            if value.is_empty() {
                return Err(CoreError::Validation(format!("{} must not be empty", field)));
            }
        }

        Ok(request)
    }
}

/// A property record as read from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub location: String,
    pub owner_id: String,
    /// Price in wei.
    pub price: String,
    /// Monthly rent in wei.
    pub rent: String,
    pub tenant_code: Option<String>,
    pub status: PropertyStatus,
}

impl Property {
    pub fn from_ledger(id: PropertyId, record: &Value) -> Result<Self> {
        let object = record
            .as_object()
            .ok_or_else(|| CoreError::MalformedRecord(format!("expected object, got {}", record)))?;

        let text = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .find_map(|k| object.get(*k))
                .and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        };

        let required = |keys: &[&str]| -> Result<String> {
            text(keys)
                .ok_or_else(|| CoreError::MalformedRecord(format!("missing field {}", keys[0])))
        };

        let status = object
            .get("status")
            .ok_or_else(|| CoreError::MalformedRecord("missing field status".to_string()))
            .and_then(PropertyStatus::from_ledger_value)?;

        Ok(Self {
            id,
            name: required(&["name"])?,
            location: required(&["location"])?,
            owner_id: text(&["ownerID", "ownerId", "owner_id"]).unwrap_or_default(),
            price: text(&["price"]).unwrap_or_else(|| "0".to_string()),
            rent: text(&["rent"]).unwrap_or_else(|| "0".to_string()),
            tenant_code: text(&["tenantcode", "tenantCode"]).filter(|s| !s.is_empty()),
            status,
        })
    }
}
