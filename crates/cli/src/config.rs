use anyhow::{Context, Result};
use ledger::classify::DEFAULT_ORACLE_SIGNATURE;
use ledger::DEFAULT_GAS;
use orchestrator::{WorkflowConfig, ACCOUNT_GAS};
use pinning::client::{DEFAULT_GATEWAY_URL, DEFAULT_PINNING_URL};
use propchain_core::DEFAULT_TOKEN_IMAGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PROPCHAIN_DIR: &str = ".propchain";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x477776da7d16723264f28a4319F23cA0e2F277eF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropchainConfig {
    pub ledger: LedgerConfig,
    pub workflow: WorkflowSettings,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub contract_address: String,
    /// Fixed signing account; the bridge's first account when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub gas: u64,
    pub claim_gas: u64,
    pub oracle_not_ready_signatures: Vec<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            from: None,
            gas: DEFAULT_GAS,
            claim_gas: ACCOUNT_GAS,
            oracle_not_ready_signatures: vec![DEFAULT_ORACLE_SIGNATURE.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub status_poll_secs: u64,
    pub oracle_poll_secs: u64,
    pub poll_error_backoff_secs: u64,
    pub wait_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_backoff_secs: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            status_poll_secs: 10,
            oracle_poll_secs: 15,
            poll_error_backoff_secs: 5,
            wait_timeout_secs: 300,
            retry_max_attempts: 2,
            retry_backoff_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub pinning_url: String,
    pub gateway_url: String,
    pub image_url: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            pinning_url: DEFAULT_PINNING_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            image_url: DEFAULT_TOKEN_IMAGE.to_string(),
        }
    }
}

impl PropchainConfig {
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(PROPCHAIN_DIR).join(CONFIG_FILE)
    }

    /// Load `.propchain/config.toml` under `root`; `None` when absent.
    pub async fn load(root: &Path) -> Result<Option<Self>> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(Some(config))
    }

    pub async fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::config_path(root);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, toml::to_string_pretty(self)?).await?;
        Ok(path)
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        let w = &self.workflow;
        WorkflowConfig::default()
            .with_gas(self.ledger.gas)
            .with_account_gas(self.ledger.claim_gas)
            .with_poll_intervals(
                Duration::from_secs(w.status_poll_secs),
                Duration::from_secs(w.oracle_poll_secs),
            )
            .with_poll_error_backoff(Duration::from_secs(w.poll_error_backoff_secs))
            .with_wait_timeout(Duration::from_secs(w.wait_timeout_secs))
            .with_retry(w.retry_max_attempts, Duration::from_secs(w.retry_backoff_secs))
            .with_image_url(&self.metadata.image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: PropchainConfig = toml::from_str(
            r#"
            [ledger]
            rpc_url = "http://bridge:9000"

            [workflow]
            wait_timeout_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.rpc_url, "http://bridge:9000");
        assert_eq!(config.ledger.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.ledger.oracle_not_ready_signatures, vec!["Invalid data"]);
        assert_eq!(config.workflow.wait_timeout_secs, 60);
        assert_eq!(config.workflow.oracle_poll_secs, 15);
        assert_eq!(config.metadata, MetadataConfig::default());
    }

    #[test]
    fn test_workflow_config_mapping() {
        let mut config = PropchainConfig::default();
        config.workflow.retry_max_attempts = 4;
        config.ledger.claim_gas = 300_000;

        let workflow = config.workflow_config();
        assert_eq!(workflow.gas, 500_000);
        assert_eq!(workflow.account_gas, 300_000);
        assert_eq!(workflow.retry_max_attempts, 4);
        assert_eq!(workflow.status_poll_interval, Duration::from_secs(10));
        assert_eq!(workflow.oracle_poll_interval, Duration::from_secs(15));
        assert_eq!(workflow.image_url, DEFAULT_TOKEN_IMAGE);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PropchainConfig::load(dir.path()).await.unwrap().is_none());

        let mut config = PropchainConfig::default();
        config.ledger.from = Some("0x1111111111111111111111111111111111111111".to_string());
        let path = config.save(dir.path()).await.unwrap();
        assert!(path.ends_with(".propchain/config.toml"));

        let loaded = PropchainConfig::load(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded, config);
    }
}
