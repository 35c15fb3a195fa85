use pinning::MetadataStore;
use propchain_core::TokenMetadata;
use tracing::{info, warn};

use crate::error::{Result, WorkflowError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMetadata {
    pub uri: String,
    /// `true` when the document is embedded as a `data:` URI.
    pub inline: bool,
}

/// Store `document` off-chain, falling back to an inline `data:` URI when
/// the store is unavailable or refuses it.
pub async fn publish_metadata(
    store: &dyn MetadataStore,
    document: &TokenMetadata,
) -> Result<PublishedMetadata> {
    match store.store(document).await {
        Ok(uri) => {
            info!(uri = %uri, "Metadata stored");
            Ok(PublishedMetadata { uri, inline: false })
        }
        Err(e) => {
            warn!(error = %e, "Metadata store failed, embedding document inline");
            let uri = pinning::data_uri(document)
                .map_err(|e| WorkflowError::Metadata(e.to_string()))?;
            Ok(PublishedMetadata { uri, inline: true })
        }
    }
}
