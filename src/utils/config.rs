use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{CoreError, Result};

pub const DEFAULT_AUTH_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_AUTH_POLL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIRM_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_CONFIRM_DELAY_MS: u64 = 2_000;
pub const DEFAULT_SESSION_STORE_FILE: &str = "wallet-session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Endpoints
    pub rpc_url: String,
    pub credential_service_url: String,

    // Network settings
    pub cluster: ClusterType,

    // Provider settings
    pub organization_id: String,
    pub app_name: String,
    pub app_uri: String,

    // Auth polling bounds (EmbeddedB)
    pub auth_poll_interval_ms: u64,
    pub auth_poll_timeout_secs: u64,

    // Confirmation bounds
    pub confirm_max_attempts: u32,
    pub confirm_delay_ms: u64,

    // Persistence
    pub session_store_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterType {
    Mainnet,
    Devnet,
    Testnet,
}

impl ClusterType {
    /// Cluster identifier in the form the external authorization protocol
    /// expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::Mainnet => "mainnet-beta",
            ClusterType::Devnet => "devnet",
            ClusterType::Testnet => "testnet",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            ClusterType::Mainnet => "https://api.mainnet-beta.solana.com",
            ClusterType::Devnet => "https://api.devnet.solana.com",
            ClusterType::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let cluster = Self::parse_cluster(&env::var("CLUSTER").unwrap_or_else(|_| "mainnet".to_string()));

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| cluster.default_rpc_url().to_string()),
            credential_service_url: env::var("CREDENTIAL_SERVICE_URL")
                .map_err(|_| CoreError::Config("CREDENTIAL_SERVICE_URL not set".into()))?,
            cluster,
            organization_id: env::var("ORGANIZATION_ID")
                .map_err(|_| CoreError::Config("ORGANIZATION_ID not set".into()))?,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Wallet Core".to_string()),
            app_uri: env::var("APP_URI").unwrap_or_else(|_| "https://example.com".to_string()),
            auth_poll_interval_ms: env::var("AUTH_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_AUTH_POLL_INTERVAL_MS.to_string())
                .parse()
                .unwrap_or(DEFAULT_AUTH_POLL_INTERVAL_MS),
            auth_poll_timeout_secs: env::var("AUTH_POLL_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_AUTH_POLL_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_AUTH_POLL_TIMEOUT_SECS),
            confirm_max_attempts: env::var("CONFIRM_MAX_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_CONFIRM_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(DEFAULT_CONFIRM_MAX_ATTEMPTS),
            confirm_delay_ms: env::var("CONFIRM_DELAY_MS")
                .unwrap_or_else(|_| DEFAULT_CONFIRM_DELAY_MS.to_string())
                .parse()
                .unwrap_or(DEFAULT_CONFIRM_DELAY_MS),
            session_store_path: env::var("SESSION_STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_SESSION_STORE_FILE.to_string()),
        })
    }

    fn parse_cluster(cluster: &str) -> ClusterType {
        match cluster.to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => ClusterType::Mainnet,
            "devnet" => ClusterType::Devnet,
            "testnet" => ClusterType::Testnet,
            _ => ClusterType::Mainnet,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.credential_service_url.is_empty() {
            return Err(CoreError::Config("credential service URL is required".into()));
        }

        if self.auth_poll_interval_ms == 0 {
            return Err(CoreError::Config("auth poll interval must be non-zero".into()));
        }

        if self.auth_poll_timeout_secs * 1_000 < self.auth_poll_interval_ms {
            return Err(CoreError::Config(
                "auth poll timeout must exceed the poll interval".into(),
            ));
        }

        if self.confirm_max_attempts == 0 {
            return Err(CoreError::Config("confirmation attempts must be non-zero".into()));
        }

        Ok(())
    }
}
