//! Off-chain storage for token metadata documents.

pub mod client;
pub mod data_uri;
pub mod error;

pub use client::{MetadataStore, PinningClient, PinningCredentials};
pub use data_uri::{data_uri, decode_data_uri};
pub use error::{PinningError, Result};
