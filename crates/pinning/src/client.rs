use async_trait::async_trait;
use chrono::Utc;
use propchain_core::TokenMetadata;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{PinningError, Result};

pub const DEFAULT_PINNING_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";

/// Stores a metadata document and returns a URI the token can point at.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn store(&self, document: &TokenMetadata) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct PinningCredentials {
    pub api_key: String,
    pub secret_api_key: String,
}

impl PinningCredentials {
    /// Read `PINATA_API_KEY` / `PINATA_SECRET_API_KEY`; `None` unless both are set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("PINATA_API_KEY").ok()?;
        let secret_api_key = std::env::var("PINATA_SECRET_API_KEY").ok()?;
        if api_key.is_empty() || secret_api_key.is_empty() {
            return None;
        }
        Some(Self {
            api_key,
            secret_api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for a Pinata-compatible JSON pinning API.
#[derive(Clone)]
pub struct PinningClient {
    client: Client,
    base_url: String,
    gateway_url: String,
    credentials: Option<PinningCredentials>,
}

impl PinningClient {
    pub fn new(base_url: impl Into<String>, gateway_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            gateway_url: gateway_url.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<PinningCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    fn gateway_uri(&self, hash: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url.trim_end_matches('/'), hash)
    }
}

#[async_trait]
impl MetadataStore for PinningClient {
    async fn store(&self, document: &TokenMetadata) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(PinningError::MissingCredentials)?;

        let file_name = format!("property-metadata-{}.json", Utc::now().timestamp_millis());
        debug!(file_name = %file_name, "Pinning metadata document");

        let response = self
            .client
            .post(format!(
                "{}/pinning/pinJSONToIPFS",
                self.base_url.trim_end_matches('/')
            ))
            .header("pinata_api_key", &credentials.api_key)
            .header("pinata_secret_api_key", &credentials.secret_api_key)
            .json(&json!({
                "pinataContent": document,
                "pinataMetadata": { "name": file_name },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PinningError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let pinned: PinResponse = response.json().await?;
        let uri = self.gateway_uri(&pinned.ipfs_hash);
        info!(uri = %uri, "Metadata pinned");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propchain_core::{MetadataAttribute, DEFAULT_TOKEN_IMAGE};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn document() -> TokenMetadata {
        TokenMetadata {
            name: "Property #1".to_string(),
            description: "A property".to_string(),
            image: DEFAULT_TOKEN_IMAGE.to_string(),
            attributes: vec![MetadataAttribute::new("Location", "Goa")],
        }
    }

    fn credentials() -> Option<PinningCredentials> {
        Some(PinningCredentials {
            api_key: "key".to_string(),
            secret_api_key: "secret".to_string(),
        })
    }

    #[tokio::test]
    async fn test_store_returns_gateway_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pinning/pinJSONToIPFS"))
            .and(header("pinata_api_key", "key"))
            .and(header("pinata_secret_api_key", "secret"))
            .and(body_partial_json(json!({"pinataContent": {"name": "Property #1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "QmHash"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = PinningClient::new(server.uri(), "https://gateway.example/")
            .with_credentials(credentials());
        let uri = client.store(&document()).await.unwrap();
        assert_eq!(uri, "https://gateway.example/ipfs/QmHash");
    }

    #[tokio::test]
    async fn test_store_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client =
            PinningClient::new(server.uri(), DEFAULT_GATEWAY_URL).with_credentials(credentials());
        match client.store(&document()).await {
            Err(PinningError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_without_credentials() {
        let client = PinningClient::new(DEFAULT_PINNING_URL, DEFAULT_GATEWAY_URL);
        assert!(client.credentials.is_none());
        assert!(matches!(
            client.store(&document()).await,
            Err(PinningError::MissingCredentials)
        ));
    }
}
