//! Wallet configuration with TOML file support.

use std::path::Path;

use sat_outputs::DEFAULT_STUB_VALUE;
use sat_types::NetworkId;
use sat_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::WalletError;

/// Configuration for the wallet boundary layer.
///
/// Loaded from TOML via [`WalletConfig::from_toml_file`] or built
/// programmatically. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Chain the wallet operates on; passed explicitly to whatever needs it.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter, e.g. `"info"` or `"debug,sat_wallet_core=trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Smallest output able to carry a non-binding asset.
    #[serde(default = "default_stub_value")]
    pub stub_value: i64,

    /// Seconds after which an advisory UTXO lock is considered stale.
    /// `0` keeps locks until they are released.
    #[serde(default)]
    pub lock_expiry_secs: u64,
}

fn default_network() -> NetworkId {
    NetworkId::Testnet
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stub_value() -> i64 {
    DEFAULT_STUB_VALUE
}

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        if config.stub_value <= 0 {
            return Err(WalletError::Config(format!(
                "stub_value must be positive, got {}",
                config.stub_value
            )));
        }
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber with the configured format and
    /// level.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been set.
    pub fn init_logging(&self) {
        sat_utils::init_logging(self.log_format, &self.log_level);
    }

    /// Like [`Self::init_logging`], but reports an already-installed
    /// subscriber as [`WalletError::Logging`].
    pub fn try_init_logging(&self) -> Result<(), WalletError> {
        sat_utils::try_init_logging(self.log_format, &self.log_level)
            .map_err(|e| WalletError::Logging(e.to_string()))
    }

    /// Lock expiry in milliseconds, `None` when locks never expire.
    pub fn lock_expiry_ms(&self) -> Option<u64> {
        (self.lock_expiry_secs > 0).then(|| self.lock_expiry_secs.saturating_mul(1000))
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            stub_value: default_stub_value(),
            lock_expiry_secs: 0,
        }
    }
}
