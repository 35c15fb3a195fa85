use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use propchain_core::TokenMetadata;

use crate::error::{PinningError, Result};

const PREFIX: &str = "data:application/json;base64,";

/// Embed a metadata document as a self-contained `data:` URI.
pub fn data_uri(document: &TokenMetadata) -> Result<String> {
    let json = document.to_pretty_json()?;
    Ok(format!("{}{}", PREFIX, STANDARD.encode(json)))
}

pub fn decode_data_uri(uri: &str) -> Result<TokenMetadata> {
    let encoded = uri
        .strip_prefix(PREFIX)
        .ok_or_else(|| PinningError::InvalidDataUri(uri.to_string()))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| PinningError::InvalidDataUri(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}
