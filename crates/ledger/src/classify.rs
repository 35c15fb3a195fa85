use crate::error::LedgerError;
use crate::types::RpcErrorObject;
use serde_json::Value;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Revert reason the contract uses while oracle data is missing.
pub const DEFAULT_ORACLE_SIGNATURE: &str = "Invalid data";

const USER_REJECTED_MESSAGE: &str = "user denied transaction signature";

// Checked in order; the longer markers must come first.
const REVERT_MARKERS: &[&str] = &[
    "execution reverted:",
    "execution reverted",
    "reverted with reason string",
    "revert",
];

/// Turns provider error objects into [`LedgerError`] classes.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    oracle_signatures: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(vec![DEFAULT_ORACLE_SIGNATURE.to_string()])
    }
}

impl ErrorClassifier {
    pub fn new(oracle_signatures: Vec<String>) -> Self {
        Self { oracle_signatures }
    }

    pub fn classify(&self, error: &RpcErrorObject) -> LedgerError {
        if error.code == USER_REJECTED_CODE
            || error.message.to_lowercase().contains(USER_REJECTED_MESSAGE)
        {
            return LedgerError::UserRejected(error.message.clone());
        }

        match revert_reason(error) {
            Some(reason) if self.is_oracle_not_ready(&reason) => {
                LedgerError::OracleNotReady { reason }
            }
            Some(reason) => LedgerError::Reverted { reason },
            None => {
                LedgerError::Unreachable(format!("RPC error {}: {}", error.code, error.message))
            }
        }
    }

    fn is_oracle_not_ready(&self, reason: &str) -> bool {
        self.oracle_signatures
            .iter()
            .any(|signature| reason.contains(signature.as_str()))
    }
}

fn revert_reason(error: &RpcErrorObject) -> Option<String> {
    let data = error.data.as_ref();
    let inner = data.and_then(|d| d.get("data"));

    // Wallet providers wrap the node error as `data.message` or `data.data`.
    let texts = [
        Some(error.message.as_str()),
        data.and_then(|d| d.get("message")).and_then(Value::as_str),
        inner.and_then(Value::as_str),
        inner.and_then(|d| d.get("message")).and_then(Value::as_str),
    ];
    let reasons: Vec<String> = texts
        .into_iter()
        .flatten()
        .filter_map(reason_after_marker)
        .collect();

    if reasons.is_empty() {
        return None;
    }
    if let Some(reason) = reasons.iter().find(|r| !r.is_empty()) {
        return Some(reason.clone());
    }

    // Geth puts the decoded reason in `data` when the message is bare.
    let decoded = [data.and_then(Value::as_str), inner.and_then(Value::as_str)]
        .into_iter()
        .flatten()
        .find(|d| !d.starts_with("0x"));
    Some(decoded.unwrap_or_default().to_string())
}

fn reason_after_marker(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    REVERT_MARKERS.iter().find_map(|marker| {
        lower.find(marker).map(|pos| {
            text[pos + marker.len()..]
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .trim()
                .to_string()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rpc_error(code: i64, message: &str) -> RpcErrorObject {
        RpcErrorObject {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_user_rejected_by_code() {
        let err =
            ErrorClassifier::default().classify(&rpc_error(4001, "User rejected the request."));
        assert_eq!(
            err,
            LedgerError::UserRejected("User rejected the request.".to_string())
        );
    }

    #[test]
    fn test_user_rejected_by_message() {
        let err = ErrorClassifier::default().classify(&rpc_error(
            -32603,
            "MetaMask Tx Signature: User denied transaction signature.",
        ));
        assert!(matches!(err, LedgerError::UserRejected(_)));
    }

    #[test]
    fn test_oracle_not_ready_revert() {
        let err = ErrorClassifier::default()
            .classify(&rpc_error(3, "execution reverted: Invalid data"));
        assert_eq!(
            err,
            LedgerError::OracleNotReady {
                reason: "Invalid data".to_string()
            }
        );
    }

    #[test]
    fn test_other_revert() {
        let err = ErrorClassifier::default().classify(&rpc_error(
            -32000,
            "VM Exception while processing transaction: reverted with reason string 'Not owner'",
        ));
        assert_eq!(
            err,
            LedgerError::Reverted {
                reason: "Not owner".to_string()
            }
        );
    }

    #[test]
    fn test_bare_revert_uses_data() {
        let error = RpcErrorObject {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(json!("Invalid data")),
        };
        assert!(ErrorClassifier::default().classify(&error).is_oracle_not_ready());
    }

    #[test]
    fn test_revert_nested_in_provider_data() {
        let error = RpcErrorObject {
            code: -32603,
            message: "Internal JSON-RPC error.".to_string(),
            data: Some(json!({
                "code": 3,
                "message": "execution reverted: Invalid data",
                "data": "0x08c379a0"
            })),
        };
        assert_eq!(
            ErrorClassifier::default().classify(&error),
            LedgerError::OracleNotReady {
                reason: "Invalid data".to_string()
            }
        );
    }

    #[test]
    fn test_revert_nested_two_levels() {
        let error = RpcErrorObject {
            code: -32603,
            message: "Internal JSON-RPC error.".to_string(),
            data: Some(json!({
                "data": {"message": "execution reverted: Only owner"}
            })),
        };
        assert_eq!(
            ErrorClassifier::default().classify(&error),
            LedgerError::Reverted {
                reason: "Only owner".to_string()
            }
        );
    }

    #[test]
    fn test_custom_signatures() {
        let classifier = ErrorClassifier::new(vec!["price unavailable".to_string()]);
        assert!(classifier
            .classify(&rpc_error(3, "execution reverted: price unavailable"))
            .is_oracle_not_ready());
        assert!(!classifier
            .classify(&rpc_error(3, "execution reverted: Invalid data"))
            .is_oracle_not_ready());
    }

    #[test]
    fn test_non_revert_errors_are_unreachable() {
        let err = ErrorClassifier::default().classify(&rpc_error(-32601, "method not found"));
        assert_eq!(
            err,
            LedgerError::Unreachable("RPC error -32601: method not found".to_string())
        );
    }
}
