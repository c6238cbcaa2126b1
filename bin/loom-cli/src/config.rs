use alloy_primitives::Address;
use config::{GatewayVersion, NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Shortest allowed interval between withdrawal receipt queries.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Environment variable holding the Infura project key.
pub const INFURA_API_KEY_ENV: &str = "INFURA_API_KEY";

/// Top-level CLI configuration.
///
/// Read from TOML, or from JSON when the file ends in `.json`. JSON files may use
/// the camelCase keys of older config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network whose presets are used for anything not set below
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// Ethereum RPC endpoint url; built from `INFURA_API_KEY` when unset
    #[serde(default, alias = "ethEndpoint")]
    pub eth_rpc_url: Option<String>,

    /// DAppChain endpoint (without `/rpc` or `/query`)
    #[serde(default, alias = "dappchainEndpoint")]
    pub dappchain_endpoint: Option<String>,

    /// DAppChain chain id
    #[serde(default, alias = "chainId")]
    pub chain_id: Option<String>,

    /// Mainnet transfer gateway
    #[serde(default, alias = "loomGatewayEthAddress")]
    pub gateway_address: Option<Address>,

    /// Mainnet LOOM token
    #[serde(default, alias = "loomTokenEthAddress")]
    pub token_address: Option<Address>,

    #[serde(default)]
    pub gateway_version: Option<GatewayVersion>,

    /// File holding the hex encoded DAppChain private key
    #[serde(
        default = "default_dappchain_key_file",
        alias = "dappchainPrivateKeyFile"
    )]
    pub dappchain_private_key_file: PathBuf,

    /// File holding the hex encoded Ethereum private key
    #[serde(default = "default_eth_key_file", alias = "ethPrivateKeyFile")]
    pub eth_private_key_file: PathBuf,

    /// Interval between withdrawal receipt queries
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long `withdraw` waits for the oracle unless `--timeout` is given; 0 waits forever
    #[serde(default = "default_withdrawal_timeout_secs")]
    pub withdrawal_timeout_secs: u64,
}

const fn default_network() -> NetworkType {
    NetworkType::Mainnet
}

fn default_dappchain_key_file() -> PathBuf {
    PathBuf::from("dappchain_private_key")
}

fn default_eth_key_file() -> PathBuf {
    PathBuf::from("eth_private_key")
}

const fn default_poll_interval_ms() -> u64 {
    2000
}

const fn default_withdrawal_timeout_secs() -> u64 {
    120
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config {}: {e}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would hammer the DAppChain node.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            eyre::bail!(
                "poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                self.poll_interval_ms
            );
        }
        Ok(())
    }

    /// Network presets with this file's overrides applied and validated.
    pub fn network_config(&self) -> eyre::Result<NetworkConfig> {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);

        if let Some(gateway) = self.gateway_address {
            builder = builder.gateway(gateway);
        }
        if let Some(token) = self.token_address {
            builder = builder.token(token);
        }
        if let Some(version) = self.gateway_version {
            builder = builder.gateway_version(version);
        }
        if let Some(chain_id) = &self.chain_id {
            builder = builder.dappchain_chain_id(chain_id.clone());
        }
        if let Some(endpoint) = &self.dappchain_endpoint {
            builder = builder.dappchain_endpoint(endpoint.clone());
        }

        let network = builder.build();
        network.validate()?;
        Ok(network)
    }

    /// Ethereum RPC url: explicit setting first, then Infura for the network.
    pub fn eth_rpc_url(&self) -> eyre::Result<String> {
        self.eth_rpc_url_with(std::env::var(INFURA_API_KEY_ENV).ok())
    }

    fn eth_rpc_url_with(&self, infura_key: Option<String>) -> eyre::Result<String> {
        if let Some(url) = &self.eth_rpc_url {
            return Ok(url.clone());
        }

        let Some(key) = infura_key.filter(|key| !key.is_empty()) else {
            eyre::bail!("eth_rpc_url is not configured and {INFURA_API_KEY_ENV} is not set");
        };

        let host = match self.network {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "rinkeby",
        };
        Ok(format!("https://{host}.infura.io/v3/{key}"))
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Oracle wait limit; `--timeout` wins over the configured default.
    pub fn withdrawal_timeout(&self, override_secs: Option<u64>) -> Option<Duration> {
        let secs = override_secs.unwrap_or(self.withdrawal_timeout_secs);
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        toml::from_str("network = \"mainnet\"").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = minimal();
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.withdrawal_timeout(None), Some(Duration::from_secs(120)));
        assert_eq!(
            config.dappchain_private_key_file,
            PathBuf::from("dappchain_private_key")
        );
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = minimal();
        assert!(config.validate().is_ok());

        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        config.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_override() {
        let config = minimal();
        assert_eq!(config.withdrawal_timeout(Some(5)), Some(Duration::from_secs(5)));
        assert_eq!(config.withdrawal_timeout(Some(0)), None);
    }

    #[test]
    fn test_infura_fallback() {
        let mut config = minimal();
        assert_eq!(
            config.eth_rpc_url_with(Some("abc".to_string())).unwrap(),
            "https://mainnet.infura.io/v3/abc"
        );
        assert!(config.eth_rpc_url_with(None).is_err());

        config.eth_rpc_url = Some("http://localhost:8545".to_string());
        assert_eq!(
            config.eth_rpc_url_with(None).unwrap(),
            "http://localhost:8545"
        );
    }

    #[test]
    fn test_testnet_needs_gateway() {
        let config: Config = toml::from_str("network = \"testnet\"").unwrap();
        assert!(config.network_config().is_err());
    }
}
