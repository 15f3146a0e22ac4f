//! Dashboard Configuration
//!
//! Configurable parameters for the peer wins dashboard.
//! Values come from a TOML file and are then overridden by CLI flags or
//! environment variables.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default block explorer used for wallet links
pub const DEFAULT_EXPLORER_URL: &str = "https://gensyn-testnet.explorer.alchemy.com";

/// Main configuration for the dashboard service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    // === Chain ===

    /// JSON-RPC endpoint of the chain (http or https)
    pub rpc_url: Option<String>,

    /// Address of the contract holding peer registrations and wins
    pub contract_address: Option<String>,

    /// Serve synthetic data instead of querying the chain
    pub use_mock_data: bool,

    // === Peers ===

    /// File listing peer ids, one per line
    pub peer_ids_file: PathBuf,

    // === Retry & pacing ===

    /// Retries per contract call after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds), doubled on each retry
    pub retry_delay_ms: u64,

    /// Pause before each per-peer win count read (milliseconds)
    pub win_pacing_ms: u64,

    // === HTTP ===

    /// Port for the HTTP API and dashboard page
    pub api_port: u16,

    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,

    /// Block explorer base URL for wallet links
    pub explorer_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            // Chain - must be supplied unless mock mode is on
            rpc_url: None,
            contract_address: None,
            use_mock_data: false,

            // Peers
            peer_ids_file: PathBuf::from("peer-ids.txt"),

            // Retry - 1s, 2s, 4s
            max_retries: 3,
            retry_delay_ms: 1000,
            win_pacing_ms: 300,

            // HTTP
            api_port: 3000,
            allowed_origins: vec![],
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    // Builder-style methods for CLI overrides. `None` keeps the file value.

    pub fn with_rpc_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.rpc_url = url;
        }
        self
    }

    pub fn with_contract_address(mut self, address: Option<String>) -> Self {
        if address.is_some() {
            self.contract_address = address;
        }
        self
    }

    pub fn with_mock_data(mut self, enabled: Option<bool>) -> Self {
        if let Some(enabled) = enabled {
            self.use_mock_data = enabled;
        }
        self
    }

    pub fn with_peer_ids_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.peer_ids_file = path;
        }
        self
    }

    pub fn with_api_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.api_port = port;
        }
        self
    }

    /// Retry policy applied to each contract read
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn win_pacing(&self) -> Duration {
        Duration::from_millis(self.win_pacing_ms)
    }

    /// Parsed contract address, if one is configured
    pub fn parsed_contract_address(&self) -> anyhow::Result<Option<Address>> {
        match &self.contract_address {
            Some(raw) => {
                let address = raw
                    .trim()
                    .parse::<Address>()
                    .map_err(|e| anyhow::anyhow!("invalid contract_address {:?}: {}", raw, e))?;
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    /// True when both the RPC endpoint and the contract are configured
    pub fn has_chain_access(&self) -> bool {
        self.rpc_url.is_some() && self.contract_address.is_some()
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("rpc_url ({}) must be an http:// or https:// URL", url);
            }
        }

        self.parsed_contract_address()?;

        if !self.use_mock_data && !self.has_chain_access() {
            anyhow::bail!(
                "rpc_url and contract_address are required unless use_mock_data is enabled"
            );
        }

        if self.retry_delay_ms == 0 {
            anyhow::bail!("retry_delay_ms must be greater than zero");
        }

        Ok(())
    }
}
