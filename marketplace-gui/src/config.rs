//! Client configuration
//!
//! The marketplace client only needs to know:
//! - Which Aptos network (and optionally which fullnode) to query
//! - Where the SimpleMarketplace module is published
//! - Where the wallet bridge listens

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Address the SimpleMarketplace module is published under when nothing else is configured.
pub const DEFAULT_MODULE_ADDRESS: &str =
    "0xe9c0c69b92cd4937ee32cefb571cb7ad10d155edfbabdfe0d65bef7771a9d1d6";

/// Environment override for [`Config::module_address`].
pub const MODULE_ADDRESS_ENV: &str = "MARKETPLACE_MODULE_ADDRESS";

/// Environment override for [`Config::wallet_endpoint`].
pub const WALLET_BRIDGE_ENV: &str = "WALLET_BRIDGE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network preset ("devnet", "testnet" or "mainnet")
    #[serde(default = "default_network")]
    pub network: String,

    /// Explicit fullnode REST URL. Overrides the network preset.
    #[serde(default)]
    pub node_url: Option<String>,

    /// Account address the SimpleMarketplace module is published under.
    #[serde(default = "default_module_address")]
    pub module_address: String,

    /// JSON-RPC endpoint of the wallet extension bridge.
    /// No endpoint means no wallet is installed.
    #[serde(default)]
    pub wallet_endpoint: Option<String>,

    /// How long the chain client waits for a submitted transaction.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
}

fn default_network() -> String {
    "devnet".to_string()
}

fn default_module_address() -> String {
    DEFAULT_MODULE_ADDRESS.to_string()
}

fn default_wait_timeout_secs() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            node_url: None,
            module_address: default_module_address(),
            wallet_endpoint: None,
            wait_timeout_secs: default_wait_timeout_secs(),
        }
    }
}

impl Config {
    /// Effective configuration: the config file (or defaults when it cannot
    /// be read), environment overrides, then validation. A problem at any
    /// step is returned next to the config so the UI can show it.
    pub fn load() -> (Self, Option<ConfigError>) {
        Self::resolve(Self::load_file(), |key| std::env::var(key).ok())
    }

    /// Read the config file, creating it with defaults on first run.
    pub fn load_file() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            log::info!("📁 Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            log::info!(
                "✅ Config loaded: network={}, module={}",
                config.network,
                config.module_address
            );
            Ok(config)
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Combine a file load result with environment overrides. Overrides are
    /// applied even when the file could not be loaded.
    pub fn resolve<F>(loaded: Result<Self, ConfigError>, lookup: F) -> (Self, Option<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, load_error) = match loaded {
            Ok(config) => (config, None),
            Err(e) => {
                log::warn!("⚠️  Config file unusable, starting from defaults: {}", e);
                (Config::default(), Some(e))
            }
        };

        config.apply_env_overrides(lookup);
        config.node_url = config.node_url.as_deref().map(normalize_endpoint);
        config.wallet_endpoint = config.wallet_endpoint.as_deref().map(normalize_endpoint);

        let invalid = config.validate().err();
        if let Some(ref e) = invalid {
            log::warn!("⚠️  Invalid config: {}", e);
        }
        (config, load_error.or(invalid))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        log::info!("💾 Config saved to: {}", config_path.display());
        Ok(())
    }

    /// Overlay values from the environment. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(MODULE_ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
            log::info!("🔧 Module address overridden by {}", MODULE_ADDRESS_ENV);
            self.module_address = addr.trim().to_string();
        }
        if let Some(url) = lookup(WALLET_BRIDGE_ENV).filter(|v| !v.trim().is_empty()) {
            log::info!("🔧 Wallet bridge overridden by {}", WALLET_BRIDGE_ENV);
            self.wallet_endpoint = Some(url.trim().to_string());
        }
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Get base data directory
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(".nft-marketplace");
        Ok(path)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.network.as_str(), "devnet" | "testnet" | "mainnet") {
            return Err(ConfigError::InvalidNetwork(self.network.clone()));
        }

        for url in self.node_url.iter().chain(self.wallet_endpoint.iter()) {
            if !has_http_scheme(url) {
                return Err(ConfigError::InvalidEndpoint(url.clone()));
            }
        }

        let hex = self
            .module_address
            .strip_prefix("0x")
            .ok_or_else(|| ConfigError::InvalidModuleAddress(self.module_address.clone()))?;
        if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidModuleAddress(
                self.module_address.clone(),
            ));
        }

        Ok(())
    }

    /// Fullnode REST base URL, with the `/v1` API prefix.
    pub fn fullnode_url(&self) -> String {
        if let Some(ref url) = self.node_url {
            return url.trim_end_matches('/').to_string();
        }
        match self.network.as_str() {
            "mainnet" => "https://fullnode.mainnet.aptoslabs.com/v1",
            "testnet" => "https://fullnode.testnet.aptoslabs.com/v1",
            _ => "https://fullnode.devnet.aptoslabs.com/v1",
        }
        .to_string()
    }

    /// Wallet bridge URL, if a wallet is installed.
    pub fn wallet_url(&self) -> Option<&str> {
        self.wallet_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Trim an endpoint and give a bare `host:port` the `http://` scheme.
/// Endpoints with some other scheme are left for [`Config::validate`] to reject.
pub fn normalize_endpoint(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Invalid network: {0} (must be 'devnet', 'testnet' or 'mainnet')")]
    InvalidNetwork(String),

    #[error("Invalid endpoint: {0} (must start with http:// or https://)")]
    InvalidEndpoint(String),

    #[error("Invalid module address: {0}")]
    InvalidModuleAddress(String),
}
