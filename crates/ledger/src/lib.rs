//! Client side of the wallet/RPC bridge in front of the property contract.
//!
//! The bridge exposes contract-level `call` and `send` over JSON-RPC. Provider
//! errors are classified here, at the boundary, so callers match on
//! [`LedgerError`] variants instead of inspecting messages.

pub mod classify;
pub mod client;
pub mod contract;
pub mod error;
pub mod rpc;
pub mod signer;
pub mod types;

pub use classify::ErrorClassifier;
pub use client::BridgeClient;
pub use contract::{calls, PropertyContract};
pub use error::{LedgerError, Result};
pub use rpc::LedgerRpc;
pub use signer::{BridgeSigner, FixedSigner, Signer};
pub use types::*;
